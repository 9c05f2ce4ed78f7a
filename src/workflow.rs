//! Static workflow transition table.
//!
//! One rule per status: the actions offered there, the statuses a ticket may
//! move to next, and the roles allowed to move it. The table is advisory; it
//! does not lock rows or guard against concurrent writers. Callers persist
//! the transition themselves.

use serde::Serialize;
use std::fmt;

use crate::error::Error;
use crate::models::{Role, TicketStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Assign,
    Reassign,
    Accept,
    ArriveOnSite,
    SubmitForApproval,
    Approve,
    Reject,
    Close,
    Reopen,
    Cancel,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Assign => "assign",
            Action::Reassign => "reassign",
            Action::Accept => "accept",
            Action::ArriveOnSite => "arrive_on_site",
            Action::SubmitForApproval => "submit_for_approval",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Close => "close",
            Action::Reopen => "reopen",
            Action::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

struct Rule {
    status: TicketStatus,
    actions: &'static [Action],
    next: &'static [TicketStatus],
    roles: &'static [Role],
}

const ADMINS: &[Role] = &[Role::SuperAdmin, Role::TenantAdmin, Role::OperationsAdmin];

static RULES: &[Rule] = &[
    Rule {
        status: TicketStatus::Open,
        actions: &[Action::Assign, Action::Cancel],
        next: &[TicketStatus::Assigned, TicketStatus::Cancelled],
        roles: ADMINS,
    },
    Rule {
        status: TicketStatus::Assigned,
        actions: &[Action::Accept, Action::Reassign, Action::Cancel],
        next: &[
            TicketStatus::InProgress,
            TicketStatus::Open,
            TicketStatus::Cancelled,
        ],
        roles: &[
            Role::SuperAdmin,
            Role::TenantAdmin,
            Role::OperationsAdmin,
            Role::Contractor,
        ],
    },
    Rule {
        status: TicketStatus::InProgress,
        actions: &[
            Action::ArriveOnSite,
            Action::SubmitForApproval,
            Action::Cancel,
        ],
        next: &[
            TicketStatus::OnSite,
            TicketStatus::AwaitingApproval,
            TicketStatus::Cancelled,
        ],
        roles: &[
            Role::SuperAdmin,
            Role::TenantAdmin,
            Role::OperationsAdmin,
            Role::Contractor,
        ],
    },
    Rule {
        status: TicketStatus::OnSite,
        actions: &[Action::SubmitForApproval],
        next: &[TicketStatus::AwaitingApproval],
        roles: &[Role::SuperAdmin, Role::TenantAdmin, Role::Contractor],
    },
    Rule {
        status: TicketStatus::AwaitingApproval,
        actions: &[Action::Approve, Action::Reject],
        next: &[TicketStatus::Completed, TicketStatus::InProgress],
        roles: ADMINS,
    },
    Rule {
        status: TicketStatus::Completed,
        actions: &[Action::Close],
        next: &[TicketStatus::Closed],
        roles: &[Role::SuperAdmin, Role::TenantAdmin],
    },
    // Soft-terminal: both reopen to OPEN, admin roles only.
    Rule {
        status: TicketStatus::Closed,
        actions: &[Action::Reopen],
        next: &[TicketStatus::Open],
        roles: &[Role::SuperAdmin, Role::TenantAdmin],
    },
    Rule {
        status: TicketStatus::Cancelled,
        actions: &[Action::Reopen],
        next: &[TicketStatus::Open],
        roles: &[Role::SuperAdmin, Role::TenantAdmin],
    },
];

fn rule_for(status: TicketStatus) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.status == status)
}

/// True iff a rule exists for `from`, `role` is authorized there, and `to`
/// is one of its legal next statuses.
pub fn can_transition(role: Role, from: TicketStatus, to: TicketStatus) -> bool {
    match rule_for(from) {
        Some(rule) => rule.roles.contains(&role) && rule.next.contains(&to),
        None => false,
    }
}

/// Validating variant of [`can_transition`] that reports the offending
/// triple on failure.
pub fn check_transition(role: Role, from: TicketStatus, to: TicketStatus) -> Result<(), Error> {
    if can_transition(role, from, to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition { role, from, to })
    }
}

/// Actions offered to `role` at `status`; empty when the role is not
/// authorized there.
pub fn available_actions(role: Role, status: TicketStatus) -> &'static [Action] {
    match rule_for(status) {
        Some(rule) if rule.roles.contains(&role) => rule.actions,
        _ => &[],
    }
}
