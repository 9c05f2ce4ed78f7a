use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Ticket priority. Each priority carries an SLA budget, see `registry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(Error::UnknownPriority(s.to_string())),
        }
    }
}

/// Workflow states. CLOSED and CANCELLED are soft-terminal: an admin can
/// reopen either back to OPEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    Assigned,
    InProgress,
    OnSite,
    AwaitingApproval,
    Completed,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 8] = [
        TicketStatus::Open,
        TicketStatus::Assigned,
        TicketStatus::InProgress,
        TicketStatus::OnSite,
        TicketStatus::AwaitingApproval,
        TicketStatus::Completed,
        TicketStatus::Closed,
        TicketStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Assigned => "ASSIGNED",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::OnSite => "ON_SITE",
            TicketStatus::AwaitingApproval => "AWAITING_APPROVAL",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::Closed => "CLOSED",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TicketStatus::Completed)
    }

    /// True once the ticket has left the active workflow, whether by
    /// completion, closure, or cancellation.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            TicketStatus::Completed | TicketStatus::Closed | TicketStatus::Cancelled
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(TicketStatus::Open),
            "ASSIGNED" => Ok(TicketStatus::Assigned),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "ON_SITE" => Ok(TicketStatus::OnSite),
            "AWAITING_APPROVAL" => Ok(TicketStatus::AwaitingApproval),
            "COMPLETED" => Ok(TicketStatus::Completed),
            "CLOSED" => Ok(TicketStatus::Closed),
            "CANCELLED" => Ok(TicketStatus::Cancelled),
            _ => Err(Error::UnknownStatus(s.to_string())),
        }
    }
}

/// Ticket category, used to route new tickets to the responsible admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    Maintenance,
    Billing,
    Access,
    General,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Maintenance => "MAINTENANCE",
            TicketType::Billing => "BILLING",
            TicketType::Access => "ACCESS",
            TicketType::General => "GENERAL",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MAINTENANCE" => Ok(TicketType::Maintenance),
            "BILLING" => Ok(TicketType::Billing),
            "ACCESS" => Ok(TicketType::Access),
            "GENERAL" => Ok(TicketType::General),
            _ => Err(Error::UnknownTicketType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    TenantAdmin,
    OperationsAdmin,
    BillingAdmin,
    Contractor,
    Requester,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::TenantAdmin => "TENANT_ADMIN",
            Role::OperationsAdmin => "OPERATIONS_ADMIN",
            Role::BillingAdmin => "BILLING_ADMIN",
            Role::Contractor => "CONTRACTOR",
            Role::Requester => "REQUESTER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "TENANT_ADMIN" => Ok(Role::TenantAdmin),
            "OPERATIONS_ADMIN" => Ok(Role::OperationsAdmin),
            "BILLING_ADMIN" => Ok(Role::BillingAdmin),
            "CONTRACTOR" => Ok(Role::Contractor),
            "REQUESTER" => Ok(Role::Requester),
            _ => Err(Error::UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ticket_type: TicketType,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub contractor_accepted_at: Option<DateTime<Utc>>,
    pub on_site_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub response_deadline: Option<DateTime<Utc>>,
    pub resolution_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    pub author: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_roundtrip() {
        for p in Priority::ALL {
            assert_eq!(p.as_str().parse::<Priority>().unwrap(), p);
        }
    }

    #[test]
    fn test_priority_case_insensitive() {
        assert_eq!("critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("Low".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn test_unknown_priority_fails() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err, Error::UnknownPriority("urgent".to_string()));
    }

    #[test]
    fn test_status_roundtrip() {
        for s in TicketStatus::ALL {
            assert_eq!(s.as_str().parse::<TicketStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_unknown_status_fails() {
        assert!("PROCESSING".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_closed_statuses() {
        assert!(TicketStatus::Completed.is_closed());
        assert!(TicketStatus::Closed.is_closed());
        assert!(TicketStatus::Cancelled.is_closed());
        assert!(!TicketStatus::OnSite.is_closed());
        assert!(TicketStatus::Completed.is_completed());
        assert!(!TicketStatus::Closed.is_completed());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("tenant_admin".parse::<Role>().unwrap(), Role::TenantAdmin);
        assert!("JANITOR".parse::<Role>().is_err());
    }
}
