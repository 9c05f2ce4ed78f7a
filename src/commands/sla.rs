use anyhow::Result;
use chrono::Utc;

use crate::db::{Database, StatusFilter};
use crate::sla::sla_info;

/// SLA board: one line per active ticket with both phase colors.
pub fn run(db: &Database) -> Result<()> {
    let tickets = db.list_tickets(StatusFilter::Active, None, None)?;

    if tickets.is_empty() {
        println!("No active tickets.");
        return Ok(());
    }

    let now = Utc::now();
    for ticket in tickets {
        let info = sla_info(&ticket, now);
        println!(
            "#{:<4} {:8} resp:{:6} {:>5.0}% {:<24} res:{:6} {:>5.0}% {:<24} {}",
            ticket.id,
            ticket.priority,
            info.response.color,
            info.response.percent_used,
            info.response.label,
            info.resolution.color,
            info.resolution.percent_used,
            info.resolution.label,
            ticket.title
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TicketStatus, TicketType};
    use crate::sla::sla_deadlines;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    #[test]
    fn test_board_runs_empty_and_populated() {
        let (db, _dir) = setup_test_db();
        assert!(run(&db).is_ok());

        let now = Utc::now();
        let a = db
            .create_ticket(
                "Heating out",
                None,
                TicketType::Maintenance,
                Priority::Critical,
                now,
                &sla_deadlines(now, Priority::Critical),
            )
            .unwrap();
        db.create_ticket(
            "Wrong invoice total",
            None,
            TicketType::Billing,
            Priority::Medium,
            now,
            &sla_deadlines(now, Priority::Medium),
        )
        .unwrap();
        db.set_status(a, TicketStatus::Assigned).unwrap();

        assert!(run(&db).is_ok());
    }
}
