use thiserror::Error;

use crate::models::{Role, TicketStatus};

/// Typed failures from the SLA/workflow core. Unknown vocabulary fails fast
/// instead of propagating garbage arithmetic downstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown priority '{0}' (expected one of: LOW, MEDIUM, HIGH, CRITICAL)")]
    UnknownPriority(String),

    #[error("unknown ticket status '{0}'")]
    UnknownStatus(String),

    #[error("unknown ticket type '{0}' (expected one of: MAINTENANCE, BILLING, ACCESS, GENERAL)")]
    UnknownTicketType(String),

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("role {role} may not transition a ticket from {from} to {to}")]
    InvalidTransition {
        role: Role,
        from: TicketStatus,
        to: TicketStatus,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
