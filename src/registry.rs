//! Static priority and ticket-type configuration.
//!
//! SLA budgets per priority and the admin role responsible for each ticket
//! category. Compiled-in and immutable; there is no behavior here beyond
//! lookup.

use crate::models::{Priority, Role, TicketType};

/// SLA budget for one priority, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaPolicy {
    pub response_minutes: i64,
    pub resolution_minutes: i64,
}

/// SLA budget for a priority. CRITICAL gets a 2-hour response window and an
/// 8-hour resolution window; LOW stretches to a full business week.
pub fn sla_policy(priority: Priority) -> SlaPolicy {
    match priority {
        Priority::Low => SlaPolicy {
            response_minutes: 24 * 60,
            resolution_minutes: 7 * 24 * 60,
        },
        Priority::Medium => SlaPolicy {
            response_minutes: 8 * 60,
            resolution_minutes: 48 * 60,
        },
        Priority::High => SlaPolicy {
            response_minutes: 4 * 60,
            resolution_minutes: 24 * 60,
        },
        Priority::Critical => SlaPolicy {
            response_minutes: 2 * 60,
            resolution_minutes: 8 * 60,
        },
    }
}

/// Admin role that triages tickets of the given category.
pub fn responsible_role(ticket_type: TicketType) -> Role {
    match ticket_type {
        TicketType::Maintenance => Role::OperationsAdmin,
        TicketType::Billing => Role::BillingAdmin,
        TicketType::Access => Role::TenantAdmin,
        TicketType::General => Role::TenantAdmin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_response_budget_is_two_hours() {
        assert_eq!(sla_policy(Priority::Critical).response_minutes, 120);
    }

    #[test]
    fn test_budgets_shrink_with_priority() {
        let mut last = i64::MAX;
        for p in Priority::ALL {
            let policy = sla_policy(p);
            assert!(policy.response_minutes < last);
            assert!(policy.response_minutes < policy.resolution_minutes);
            last = policy.response_minutes;
        }
    }

    #[test]
    fn test_billing_routes_to_billing_admin() {
        assert_eq!(responsible_role(TicketType::Billing), Role::BillingAdmin);
        assert_eq!(
            responsible_role(TicketType::Maintenance),
            Role::OperationsAdmin
        );
    }
}
