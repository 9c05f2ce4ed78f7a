use anyhow::{bail, Result};

use crate::db::Database;

pub fn run(db: &Database, id: i64, text: &str, author: Option<&str>) -> Result<()> {
    if db.get_ticket(id)?.is_none() {
        bail!("Ticket #{} not found", id);
    }

    db.add_comment(id, author, text)?;
    println!("Added comment to ticket #{}", id);
    Ok(())
}
