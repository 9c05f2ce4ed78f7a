use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::Database;
use crate::registry;
use crate::sla::{sla_info, SlaPhase};
use crate::timeline::ticket_timeline;

pub fn run(db: &Database, id: i64) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket #{} not found", id),
    };

    println!("Ticket #{}: {}", ticket.id, ticket.title);
    println!("Status: {}", ticket.status);
    println!(
        "Type: {} (responsible: {})",
        ticket.ticket_type,
        registry::responsible_role(ticket.ticket_type)
    );
    println!("Priority: {}", ticket.priority);
    println!("Created: {}", ticket.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", ticket.updated_at.format("%Y-%m-%d %H:%M:%S"));

    let info = sla_info(&ticket, Utc::now());
    println!("\nSLA:");
    print_phase("Response", &info.response);
    print_phase("Resolution", &info.resolution);

    let tl = ticket_timeline(&ticket);
    let rows = [
        ("Time to assign", tl.time_to_assign),
        ("Time to accept", tl.time_to_accept),
        ("Time to on-site", tl.time_to_on_site),
        ("Time to complete", tl.time_to_complete),
        ("Total resolution", tl.total_resolution),
    ];
    if rows.iter().any(|(_, v)| v.is_some()) {
        println!("\nTimeline:");
        for (name, value) in rows {
            if let Some(minutes) = value {
                println!("  {:<18} {}h {}m", name, minutes / 60, minutes % 60);
            }
        }
    }

    if let Some(desc) = &ticket.description {
        if !desc.is_empty() {
            println!("\nDescription:");
            for line in desc.lines() {
                println!("  {}", line);
            }
        }
    }

    let comments = db.get_comments(id)?;
    if !comments.is_empty() {
        println!("\nComments:");
        for comment in comments {
            let author = comment.author.as_deref().unwrap_or("anonymous");
            println!(
                "  [{}] {}: {}",
                comment.created_at.format("%Y-%m-%d %H:%M"),
                author,
                comment.content
            );
        }
    }

    Ok(())
}

fn print_phase(name: &str, phase: &SlaPhase) {
    println!(
        "  {:<11} {:6} {:>5.1}%  due {}  {}",
        name,
        phase.color,
        phase.percent_used,
        phase.deadline.format("%Y-%m-%d %H:%M"),
        phase.label
    );
}
