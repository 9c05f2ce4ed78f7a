//! ticktrack: a lean helpdesk ticket tracker.
//!
//! The core is a pure SLA and workflow engine: `registry` holds the static
//! priority budgets and routing table, `workflow` the legal status
//! transitions per role, `sla` computes deadlines and live breach state, and
//! `timeline` summarizes elapsed time between milestones. `db` persists
//! tickets in SQLite and `commands` hosts the CLI surface.

pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod sla;
pub mod timeline;
pub mod workflow;
