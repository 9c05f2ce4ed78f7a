//! SLA deadline and status computation.
//!
//! Everything here is pure arithmetic over wall-clock time. The reference
//! instant `now` is always an explicit parameter so the same inputs give the
//! same answer, in tests and in production alike.
//!
//! A ticket has two SLA phases. The response phase ends when a contractor
//! accepts the ticket (or, failing that, when it was assigned and work has
//! moved on). The resolution phase ends when the work is completed. Each
//! phase gets a color: GREEN under 75% of budget, YELLOW from 75%, RED from
//! 100%, and GREY once the phase no longer needs attention.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::{Priority, Ticket, TicketStatus};
use crate::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deadlines {
    pub response: DateTime<Utc>,
    pub resolution: DateTime<Utc>,
}

/// Response and resolution deadlines for a ticket created at `created_at`.
pub fn sla_deadlines(created_at: DateTime<Utc>, priority: Priority) -> Deadlines {
    let policy = registry::sla_policy(priority);
    Deadlines {
        response: created_at + Duration::minutes(policy.response_minutes),
        resolution: created_at + Duration::minutes(policy.resolution_minutes),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaColor {
    Green,
    Yellow,
    Red,
    Grey,
}

impl SlaColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaColor::Green => "green",
            SlaColor::Yellow => "yellow",
            SlaColor::Red => "red",
            SlaColor::Grey => "grey",
        }
    }
}

impl fmt::Display for SlaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Computed state of one SLA phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaPhase {
    pub color: SlaColor,
    pub deadline: DateTime<Utc>,
    /// Minutes until the deadline while the phase is pending; negative once
    /// overdue. `None` after the phase completed.
    pub minutes_remaining: Option<i64>,
    pub percent_used: f64,
    pub breached: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaInfo {
    pub response: SlaPhase,
    pub resolution: SlaPhase,
}

/// Live SLA state for a ticket at the instant `now`.
///
/// Persisted deadlines on the ticket win over recomputation, so a deadline
/// frozen at creation time stays authoritative even if the priority table
/// changes later.
pub fn sla_info(ticket: &Ticket, now: DateTime<Utc>) -> SlaInfo {
    let policy = registry::sla_policy(ticket.priority);
    let computed = sla_deadlines(ticket.created_at, ticket.priority);
    let response_deadline = ticket.response_deadline.unwrap_or(computed.response);
    let resolution_deadline = ticket.resolution_deadline.unwrap_or(computed.resolution);

    let closed = ticket.status.is_closed();

    // Response ends at contractor acceptance; else at assignment once the
    // ticket has moved past intake; else it is pinned to "now" for closed
    // tickets so a cancelled ticket stops accruing lateness.
    let past_intake = !matches!(ticket.status, TicketStatus::Open | TicketStatus::Assigned);
    let response_done_at = ticket
        .contractor_accepted_at
        .or(if past_intake { ticket.assigned_at } else { None })
        .or(if closed { Some(now) } else { None });

    let resolution_done_at = ticket.completed_at.or(if closed { Some(now) } else { None });

    SlaInfo {
        response: build_phase(
            ticket.created_at,
            response_deadline,
            policy.response_minutes,
            response_done_at,
            false,
            now,
        ),
        resolution: build_phase(
            ticket.created_at,
            resolution_deadline,
            policy.resolution_minutes,
            resolution_done_at,
            // Completed/closed tickets show grey regardless of elapsed time.
            closed,
            now,
        ),
    }
}

fn build_phase(
    created: DateTime<Utc>,
    deadline: DateTime<Utc>,
    budget_minutes: i64,
    done_at: Option<DateTime<Utc>>,
    force_grey: bool,
    now: DateTime<Utc>,
) -> SlaPhase {
    let reference = done_at.unwrap_or(now);
    let elapsed_secs = (reference - created).num_seconds() as f64;
    let budget_secs = (budget_minutes * 60) as f64;
    let percent_used = elapsed_secs / budget_secs * 100.0;
    let breached = percent_used >= 100.0;

    let (color, minutes_remaining, label) = match done_at {
        Some(done) => {
            let color = if force_grey || !breached {
                SlaColor::Grey
            } else {
                SlaColor::Red
            };
            (color, None, done_label(breached, done, deadline))
        }
        None => {
            let color = color_for(percent_used);
            let remaining = (deadline - now).num_minutes();
            (color, Some(remaining), pending_label(remaining))
        }
    };

    SlaPhase {
        color,
        deadline,
        minutes_remaining,
        percent_used,
        breached,
        label,
    }
}

fn color_for(percent_used: f64) -> SlaColor {
    if percent_used >= 100.0 {
        SlaColor::Red
    } else if percent_used >= 75.0 {
        SlaColor::Yellow
    } else {
        SlaColor::Green
    }
}

fn pending_label(minutes_remaining: i64) -> String {
    if minutes_remaining < 0 {
        format!("Overdue by {}", format_minutes(-minutes_remaining))
    } else if minutes_remaining == 0 {
        "Due now".to_string()
    } else {
        format!("{} remaining", format_minutes(minutes_remaining))
    }
}

fn done_label(breached: bool, done_at: DateTime<Utc>, deadline: DateTime<Utc>) -> String {
    if breached {
        let over = (done_at - deadline).num_minutes().max(0);
        format!("Breached by {}", format_minutes(over))
    } else {
        "Met".to_string()
    }
}

fn format_minutes(minutes: i64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
