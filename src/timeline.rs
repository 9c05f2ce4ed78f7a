//! Elapsed time between ticket milestones.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Ticket;

/// Minute deltas between consecutive milestones. Each delta is measured from
/// the latest earlier milestone that exists, falling back to `created_at`.
/// `None` means the milestone has not happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TicketTimeline {
    pub time_to_assign: Option<i64>,
    pub time_to_accept: Option<i64>,
    pub time_to_on_site: Option<i64>,
    pub time_to_complete: Option<i64>,
    pub total_resolution: Option<i64>,
}

pub fn ticket_timeline(ticket: &Ticket) -> TicketTimeline {
    let created = ticket.created_at;

    let accept_base = ticket.assigned_at.unwrap_or(created);
    let on_site_base = ticket
        .contractor_accepted_at
        .or(ticket.assigned_at)
        .unwrap_or(created);
    let complete_base = ticket
        .on_site_at
        .or(ticket.contractor_accepted_at)
        .or(ticket.assigned_at)
        .unwrap_or(created);

    TicketTimeline {
        time_to_assign: ticket.assigned_at.map(|at| minutes(created, at)),
        time_to_accept: ticket
            .contractor_accepted_at
            .map(|at| minutes(accept_base, at)),
        time_to_on_site: ticket.on_site_at.map(|at| minutes(on_site_base, at)),
        time_to_complete: ticket.completed_at.map(|at| minutes(complete_base, at)),
        total_resolution: ticket.completed_at.map(|at| minutes(created, at)),
    }
}

fn minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_minutes()
}
