use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::db::Database;

pub fn run(path: &Path) -> Result<()> {
    let ticktrack_dir = path.join(".ticktrack");
    if ticktrack_dir.exists() {
        bail!("Already initialized: {} exists", ticktrack_dir.display());
    }

    fs::create_dir_all(&ticktrack_dir).context("Failed to create .ticktrack directory")?;
    Database::open(&ticktrack_dir.join("tickets.db"))?;

    println!("Initialized ticktrack in {}", ticktrack_dir.display());
    Ok(())
}
