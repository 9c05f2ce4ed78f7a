use anyhow::Result;
use chrono::Utc;

use crate::db::Database;
use crate::models::{Priority, TicketType};
use crate::registry;
use crate::sla::sla_deadlines;

pub fn run(
    db: &Database,
    title: &str,
    description: Option<&str>,
    priority: &str,
    ticket_type: &str,
) -> Result<()> {
    let priority: Priority = priority.parse()?;
    let ticket_type: TicketType = ticket_type.parse()?;

    let now = Utc::now();
    let deadlines = sla_deadlines(now, priority);
    let id = db.create_ticket(title, description, ticket_type, priority, now, &deadlines)?;

    println!(
        "Created ticket #{} ({} {}, routed to {})",
        id,
        priority,
        ticket_type,
        registry::responsible_role(ticket_type)
    );
    println!(
        "Response due {}, resolution due {}",
        deadlines.response.format("%Y-%m-%d %H:%M"),
        deadlines.resolution.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StatusFilter;
    use crate::models::TicketStatus;
    use chrono::Duration;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    #[test]
    fn test_create_ticket() {
        let (db, _dir) = setup_test_db();
        run(&db, "Elevator stuck", None, "critical", "maintenance").unwrap();

        let tickets = db.list_tickets(StatusFilter::All, None, None).unwrap();
        assert_eq!(tickets.len(), 1);
        let t = &tickets[0];
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.priority, Priority::Critical);
        assert_eq!(
            t.response_deadline.unwrap(),
            t.created_at + Duration::minutes(120)
        );
    }

    #[test]
    fn test_create_rejects_unknown_priority() {
        let (db, _dir) = setup_test_db();
        let result = run(&db, "Test", None, "urgent", "general");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown priority"));
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let (db, _dir) = setup_test_db();
        let result = run(&db, "Test", None, "low", "plumbing");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown ticket type"));
    }
}
