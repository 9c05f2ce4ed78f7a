use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};

use crate::db::Database;

pub fn run(db: &Database, id: i64, force: bool) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    if !force {
        print!("Delete ticket #{} \"{}\"? [y/N] ", id, ticket.title);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if db.delete_ticket(id)? {
        println!("Deleted ticket #{}", id);
    } else {
        bail!("Ticket #{} not found", id);
    }

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

    #[test]
    fn test_force_delete() {
        let (db, _dir) = setup_test_db();
        let now = Utc::now();
        let id = db
            .create_ticket(
                "Duplicate ticket",
                None,
                TicketType::General,
                Priority::Low,
                now,
                &sla_deadlines(now, Priority::Low),
            )
            .unwrap();

        run(&db, id, true).unwrap();
        assert!(db.get_ticket(id).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_ticket() {
        let (db, _dir) = setup_test_db();
        assert!(run(&db, 77, true).is_err());
    }
}
