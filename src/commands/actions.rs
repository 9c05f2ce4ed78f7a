use anyhow::{bail, Result};

use crate::db::Database;
use crate::models::Role;
use crate::workflow;

pub fn run(db: &Database, id: i64, role: &str) -> Result<()> {
    let role: Role = role.parse()?;

    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    let actions = workflow::available_actions(role, ticket.status);
    if actions.is_empty() {
        println!(
            "No actions available to {} on ticket #{} ({})",
            role, id, ticket.status
        );
    } else {
        println!("Actions for {} on ticket #{} ({}):", role, id, ticket.status);
        for action in actions {
            println!("  {}", action);
        }
    }

    Ok(())
}
