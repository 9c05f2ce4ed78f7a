use anyhow::Result;
use chrono::Utc;

use crate::db::{Database, StatusFilter};
use crate::models::{Priority, TicketType};
use crate::sla::sla_info;

pub fn run(
    db: &Database,
    status: &str,
    priority: Option<&str>,
    ticket_type: Option<&str>,
    breached_only: bool,
) -> Result<()> {
    let filter = match status.to_ascii_lowercase().as_str() {
        "active" => StatusFilter::Active,
        "all" => StatusFilter::All,
        other => StatusFilter::Is(other.parse()?),
    };
    let priority = priority.map(|p| p.parse::<Priority>()).transpose()?;
    let ticket_type = ticket_type.map(|t| t.parse::<TicketType>()).transpose()?;

    let tickets = db.list_tickets(filter, priority, ticket_type)?;
    let now = Utc::now();

    let mut shown = 0;
    for ticket in tickets {
        let info = sla_info(&ticket, now);
        if breached_only && !info.response.breached && !info.resolution.breached {
            continue;
        }
        shown += 1;
        println!(
            "#{:<4} [{:17}] {:8} {:<40} res:{:6} {}",
            ticket.id,
            ticket.status,
            ticket.priority,
            truncate(&ticket.title, 40),
            info.resolution.color,
            info.resolution.label
        );
    }

    if shown == 0 {
        println!("No tickets found.");
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}
