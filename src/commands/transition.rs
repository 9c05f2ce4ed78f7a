use anyhow::{bail, Result};
use tracing::info;

use crate::db::Database;
use crate::models::{Role, TicketStatus};
use crate::workflow;

/// Apply a status change as `role`. The workflow table decides legality; the
/// database stamps the milestone timestamp for the entered status.
pub fn run(db: &Database, id: i64, to: &str, role: &str) -> Result<()> {
    let to: TicketStatus = to.parse()?;
    let role: Role = role.parse()?;

    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    workflow::check_transition(role, ticket.status, to)?;

    if !db.set_status(id, to)? {
        bail!("Ticket #{} not found", id);
    }

    info!(id, from = ticket.status.as_str(), to = to.as_str(), role = role.as_str(), "transitioned");
    println!("Ticket #{}: {} -> {} (as {})", id, ticket.status, to, role);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TicketType};
    use crate::sla::sla_deadlines;
    use chrono::Utc;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn create(db: &Database) -> i64 {
        let now = Utc::now();
        db.create_ticket(
            "Fuse box sparking",
            None,
            TicketType::Maintenance,
            Priority::Critical,
            now,
            &sla_deadlines(now, Priority::Critical),
        )
        .unwrap()
    }

    #[test]
    fn test_admin_assigns_open_ticket() {
        let (db, _dir) = setup_test_db();
        let id = create(&db);

        run(&db, id, "assigned", "tenant_admin").unwrap();

        let t = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(t.status, TicketStatus::Assigned);
        assert!(t.assigned_at.is_some());
    }

    #[test]
    fn test_contractor_cannot_assign() {
        let (db, _dir) = setup_test_db();
        let id = create(&db);

        let result = run(&db, id, "assigned", "contractor");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("may not transition"));

        let t = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(t.status, TicketStatus::Open);
    }

    #[test]
    fn test_full_lifecycle() {
        let (db, _dir) = setup_test_db();
        let id = create(&db);

        run(&db, id, "assigned", "tenant_admin").unwrap();
        run(&db, id, "in_progress", "contractor").unwrap();
        run(&db, id, "on_site", "contractor").unwrap();
        run(&db, id, "awaiting_approval", "contractor").unwrap();
        run(&db, id, "completed", "tenant_admin").unwrap();
        run(&db, id, "closed", "tenant_admin").unwrap();

        let t = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(t.status, TicketStatus::Closed);
        assert!(t.contractor_accepted_at.is_some());
        assert!(t.on_site_at.is_some());
        assert!(t.completed_at.is_some());
    }

    #[test]
    fn test_reopen_cancelled_ticket() {
        let (db, _dir) = setup_test_db();
        let id = create(&db);

        run(&db, id, "cancelled", "tenant_admin").unwrap();
        run(&db, id, "open", "super_admin").unwrap();

        let t = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(t.status, TicketStatus::Open);
    }

    #[test]
    fn test_skipping_states_rejected() {
        let (db, _dir) = setup_test_db();
        let id = create(&db);

        assert!(run(&db, id, "completed", "super_admin").is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let (db, _dir) = setup_test_db();
        let id = create(&db);

        let result = run(&db, id, "assigned", "janitor");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown role"));
    }

    #[test]
    fn test_missing_ticket() {
        let (db, _dir) = setup_test_db();
        assert!(run(&db, 404, "assigned", "tenant_admin").is_err());
    }
}
