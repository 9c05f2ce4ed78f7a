use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::db::{Database, StatusFilter};
use crate::models::Ticket;
use crate::sla::{sla_info, SlaInfo};
use crate::timeline::ticket_timeline;

#[derive(Serialize, Deserialize)]
pub struct ExportedTicket {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ticket_type: String,
    pub priority: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
    pub response_status: String,
    pub response_label: String,
    pub resolution_status: String,
    pub resolution_label: String,
    pub total_resolution_minutes: Option<i64>,
    pub comments: Vec<ExportedComment>,
}

#[derive(Serialize, Deserialize)]
pub struct ExportedComment {
    pub author: Option<String>,
    pub content: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize)]
pub struct ExportData {
    pub version: i32,
    pub exported_at: String,
    pub tickets: Vec<ExportedTicket>,
}

fn export_ticket(db: &Database, ticket: &Ticket, now: DateTime<Utc>) -> Result<ExportedTicket> {
    let comments = db.get_comments(ticket.id)?;
    let info: SlaInfo = sla_info(ticket, now);
    let tl = ticket_timeline(ticket);

    Ok(ExportedTicket {
        id: ticket.id,
        title: ticket.title.clone(),
        description: ticket.description.clone(),
        ticket_type: ticket.ticket_type.to_string(),
        priority: ticket.priority.to_string(),
        status: ticket.status.to_string(),
        created_at: ticket.created_at.to_rfc3339(),
        updated_at: ticket.updated_at.to_rfc3339(),
        completed_at: ticket.completed_at.map(|dt| dt.to_rfc3339()),
        response_status: info.response.color.to_string(),
        response_label: info.response.label,
        resolution_status: info.resolution.color.to_string(),
        resolution_label: info.resolution.label,
        total_resolution_minutes: tl.total_resolution,
        comments: comments
            .into_iter()
            .map(|c| ExportedComment {
                author: c.author,
                content: c.content,
                created_at: c.created_at.to_rfc3339(),
            })
            .collect(),
    })
}

fn gather(db: &Database) -> Result<ExportData> {
    let tickets = db.list_tickets(StatusFilter::All, None, None)?;
    let now = Utc::now();

    let exported: Vec<ExportedTicket> = tickets
        .iter()
        .map(|t| export_ticket(db, t, now))
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportData {
        version: 1,
        exported_at: now.to_rfc3339(),
        tickets: exported,
    })
}

pub fn run_json(db: &Database, output_path: Option<&str>) -> Result<()> {
    let data = gather(db)?;
    let json = serde_json::to_string_pretty(&data)?;

    match output_path {
        Some(path) => {
            fs::write(path, json).context("Failed to write export file")?;
            eprintln!("Exported {} tickets to {}", data.tickets.len(), path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

pub fn run_markdown(db: &Database, output_path: Option<&str>) -> Result<()> {
    let data = gather(db)?;
    let mut md = String::new();

    md.push_str("# Ticket SLA Report\n\n");
    md.push_str(&format!(
        "Exported: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let (closed, active): (Vec<_>, Vec<_>) = data
        .tickets
        .iter()
        .partition(|t| matches!(t.status.as_str(), "COMPLETED" | "CLOSED" | "CANCELLED"));

    if !active.is_empty() {
        md.push_str("## Active Tickets\n\n");
        for ticket in &active {
            write_ticket_md(&mut md, ticket);
        }
    }

    if !closed.is_empty() {
        md.push_str("## Closed Tickets\n\n");
        for ticket in &closed {
            write_ticket_md(&mut md, ticket);
        }
    }

    match output_path {
        Some(path) => {
            fs::write(path, md).context("Failed to write export file")?;
            eprintln!("Exported {} tickets to {}", data.tickets.len(), path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", md)?;
        }
    }
    Ok(())
}

fn write_ticket_md(md: &mut String, ticket: &ExportedTicket) {
    md.push_str(&format!(
        "### #{} {} ({} {})\n\n",
        ticket.id, ticket.title, ticket.priority, ticket.status
    ));
    md.push_str(&format!(
        "- Response: {} ({})\n- Resolution: {} ({})\n",
        ticket.response_status,
        ticket.response_label,
        ticket.resolution_status,
        ticket.resolution_label
    ));
    if let Some(minutes) = ticket.total_resolution_minutes {
        md.push_str(&format!(
            "- Resolved in: {}h {}m\n",
            minutes / 60,
            minutes % 60
        ));
    }
    md.push('\n');
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

    fn seed(db: &Database) -> i64 {
        let now = Utc::now();
        let id = db
            .create_ticket(
                "Lobby light flickers",
                Some("Second fixture from the door"),
                TicketType::Maintenance,
                Priority::Low,
                now,
                &sla_deadlines(now, Priority::Low),
            )
            .unwrap();
        db.add_comment(id, Some("lee"), "Bulb replaced, still flickers")
            .unwrap();
        id
    }

    #[test]
    fn test_json_export_roundtrips() {
        let (db, dir) = setup_test_db();
        let id = seed(&db);
        db.set_status(id, TicketStatus::Completed).unwrap();

        let path = dir.path().join("export.json");
        run_json(&db, Some(path.to_str().unwrap())).unwrap();

        let data: ExportData =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(data.version, 1);
        assert_eq!(data.tickets.len(), 1);
        let t = &data.tickets[0];
        assert_eq!(t.status, "COMPLETED");
        assert_eq!(t.resolution_status, "grey");
        assert_eq!(t.comments.len(), 1);
        assert!(t.total_resolution_minutes.is_some());
    }

    #[test]
    fn test_markdown_export_sections() {
        let (db, dir) = setup_test_db();
        seed(&db);

        let path = dir.path().join("report.md");
        run_markdown(&db, Some(path.to_str().unwrap())).unwrap();

        let md = fs::read_to_string(&path).unwrap();
        assert!(md.contains("# Ticket SLA Report"));
        assert!(md.contains("## Active Tickets"));
        assert!(md.contains("Lobby light flickers"));
    }
}
