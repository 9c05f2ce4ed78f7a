use anyhow::{bail, Result};

use crate::db::Database;
use crate::models::{Priority, TicketType};
use crate::sla::sla_deadlines;

pub fn run(
    db: &Database,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    priority: Option<&str>,
    ticket_type: Option<&str>,
) -> Result<()> {
    if title.is_none() && description.is_none() && priority.is_none() && ticket_type.is_none() {
        bail!("Nothing to update. Use --title, --description, --priority, or --type");
    }

    let priority = priority.map(|p| p.parse::<Priority>()).transpose()?;
    let ticket_type = ticket_type.map(|t| t.parse::<TicketType>()).transpose()?;

    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    // A priority change re-derives the SLA deadlines from the original
    // creation time, so the ticket is judged against its new budget.
    let deadlines = match priority {
        Some(p) if p != ticket.priority => Some(sla_deadlines(ticket.created_at, p)),
        _ => None,
    };

    if db.update_ticket(id, title, description, priority, ticket_type, deadlines.as_ref())? {
        println!("Updated ticket #{}", id);
    } else {
        bail!("Ticket #{} not found", id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn create(db: &Database, priority: Priority) -> i64 {
        let now = Utc::now();
        db.create_ticket(
            "Intercom offline",
            None,
            TicketType::Access,
            priority,
            now,
            &sla_deadlines(now, priority),
        )
        .unwrap()
    }

    #[test]
    fn test_update_title() {
        let (db, _dir) = setup_test_db();
        let id = create(&db, Priority::Medium);

        run(&db, id, Some("New title"), None, None, None).unwrap();

        let ticket = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(ticket.title, "New title");
    }

    #[test]
    fn test_update_nothing_fails() {
        let (db, _dir) = setup_test_db();
        let id = create(&db, Priority::Medium);

        let result = run(&db, id, None, None, None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Nothing to update"));
    }

    #[test]
    fn test_update_nonexistent_ticket() {
        let (db, _dir) = setup_test_db();
        let result = run(&db, 99999, Some("New title"), None, None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_update_invalid_priority() {
        let (db, _dir) = setup_test_db();
        let id = create(&db, Priority::Medium);

        let result = run(&db, id, None, None, Some("urgent"), None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown priority"));
    }

    #[test]
    fn test_priority_change_recomputes_deadlines() {
        let (db, _dir) = setup_test_db();
        let id = create(&db, Priority::Low);
        let before = db.get_ticket(id).unwrap().unwrap();

        run(&db, id, None, None, Some("critical"), None).unwrap();

        let after = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(after.priority, Priority::Critical);
        assert_eq!(
            after.response_deadline.unwrap(),
            before.created_at + Duration::minutes(120)
        );
        assert_eq!(
            after.resolution_deadline.unwrap(),
            before.created_at + Duration::minutes(480)
        );
    }

    #[test]
    fn test_same_priority_keeps_deadlines() {
        let (db, _dir) = setup_test_db();
        let id = create(&db, Priority::High);
        let before = db.get_ticket(id).unwrap().unwrap();

        run(&db, id, None, None, Some("high"), None).unwrap();

        let after = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(after.response_deadline, before.response_deadline);
    }

    #[test]
    fn test_update_preserves_unchanged_fields() {
        let (db, _dir) = setup_test_db();
        let id = create(&db, Priority::High);

        run(&db, id, Some("Renamed"), None, None, None).unwrap();

        let ticket = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(ticket.title, "Renamed");
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.ticket_type, TicketType::Access);
    }

    proptest! {
        #[test]
        fn prop_update_title_roundtrip(new_title in "[a-zA-Z0-9 ]{1,30}") {
            let (db, _dir) = setup_test_db();
            let id = create(&db, Priority::Medium);

            run(&db, id, Some(&new_title), None, None, None).unwrap();

            let ticket = db.get_ticket(id).unwrap().unwrap();
            prop_assert_eq!(ticket.title, new_title);
        }

        #[test]
        fn prop_update_priority_invalid(
            priority in "[a-zA-Z]{1,10}"
                .prop_filter("Exclude valid priorities", |s| {
                    !["low", "medium", "high", "critical"]
                        .contains(&s.to_ascii_lowercase().as_str())
                })
        ) {
            let (db, _dir) = setup_test_db();
            let id = create(&db, Priority::Medium);

            let result = run(&db, id, None, None, Some(&priority), None);
            prop_assert!(result.is_err());
        }
    }
}
