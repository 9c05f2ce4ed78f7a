use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::Error;
use crate::models::{Comment, Priority, Ticket, TicketStatus, TicketType};
use crate::sla::Deadlines;

const SCHEMA_VERSION: i32 = 1;

/// Status selection for ticket listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    /// Everything still in the active workflow (not completed/closed/cancelled).
    Active,
    Is(TicketStatus),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM pragma_user_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            debug!(from = version, to = SCHEMA_VERSION, "initializing schema");
            self.conn.execute_batch(
                r#"
                -- Core tickets table. Milestone timestamps and the SLA
                -- deadlines frozen at creation time live alongside the
                -- ticket itself.
                CREATE TABLE IF NOT EXISTS tickets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    description TEXT,
                    ticket_type TEXT NOT NULL DEFAULT 'GENERAL',
                    priority TEXT NOT NULL DEFAULT 'MEDIUM',
                    status TEXT NOT NULL DEFAULT 'OPEN',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    assigned_at TEXT,
                    contractor_accepted_at TEXT,
                    on_site_at TEXT,
                    completed_at TEXT,
                    response_deadline TEXT,
                    resolution_deadline TEXT
                );

                -- Comments
                CREATE TABLE IF NOT EXISTS comments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ticket_id INTEGER NOT NULL,
                    author TEXT,
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
                );

                -- Indexes
                CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
                CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
                CREATE INDEX IF NOT EXISTS idx_comments_ticket ON comments(ticket_id);
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        // Enable foreign keys
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(())
    }

    // Ticket CRUD. `created_at` is passed in so the stored creation time and
    // the SLA deadlines computed from it share the same instant.
    pub fn create_ticket(
        &self,
        title: &str,
        description: Option<&str>,
        ticket_type: TicketType,
        priority: Priority,
        created_at: DateTime<Utc>,
        deadlines: &Deadlines,
    ) -> Result<i64> {
        let now = created_at.to_rfc3339();
        self.conn.execute(
            "INSERT INTO tickets (title, description, ticket_type, priority, status, created_at, updated_at, response_deadline, resolution_deadline)
             VALUES (?1, ?2, ?3, ?4, 'OPEN', ?5, ?5, ?6, ?7)",
            params![
                title,
                description,
                ticket_type.as_str(),
                priority.as_str(),
                now,
                deadlines.response.to_rfc3339(),
                deadlines.resolution.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tickets WHERE id = ?1",
            TICKET_COLUMNS
        ))?;

        let ticket = stmt.query_row([id], ticket_from_row).ok();
        Ok(ticket)
    }

    pub fn list_tickets(
        &self,
        status: StatusFilter,
        priority: Option<Priority>,
        ticket_type: Option<TicketType>,
    ) -> Result<Vec<Ticket>> {
        let mut sql = format!("SELECT {} FROM tickets", TICKET_COLUMNS);
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        match status {
            StatusFilter::All => {}
            StatusFilter::Active => {
                conditions
                    .push("status NOT IN ('COMPLETED', 'CLOSED', 'CANCELLED')".to_string());
            }
            StatusFilter::Is(s) => {
                conditions.push("status = ?".to_string());
                params_vec.push(Box::new(s.as_str()));
            }
        }

        if let Some(p) = priority {
            conditions.push("priority = ?".to_string());
            params_vec.push(Box::new(p.as_str()));
        }

        if let Some(t) = ticket_type {
            conditions.push("ticket_type = ?".to_string());
            params_vec.push(Box::new(t.as_str()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// Update editable fields. `deadlines` carries recomputed SLA deadlines
    /// when the priority changed.
    pub fn update_ticket(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        priority: Option<Priority>,
        ticket_type: Option<TicketType>,
        deadlines: Option<&Deadlines>,
    ) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let mut updates = vec!["updated_at = ?1".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now)];

        if let Some(t) = title {
            updates.push(format!("title = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(t.to_string()));
        }

        if let Some(d) = description {
            updates.push(format!("description = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(d.to_string()));
        }

        if let Some(p) = priority {
            updates.push(format!("priority = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(p.as_str()));
        }

        if let Some(t) = ticket_type {
            updates.push(format!("ticket_type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(t.as_str()));
        }

        if let Some(d) = deadlines {
            updates.push(format!("response_deadline = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(d.response.to_rfc3339()));
            updates.push(format!("resolution_deadline = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(d.resolution.to_rfc3339()));
        }

        params_vec.push(Box::new(id));
        let sql = format!(
            "UPDATE tickets SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = self.conn.execute(&sql, params_refs.as_slice())?;
        Ok(rows > 0)
    }

    /// Persist a status change and stamp the milestone timestamp for the
    /// entered status. Acceptance and on-site stamps are first-write-wins so
    /// a rejected approval does not rewrite history; reopening clears the
    /// completion stamp so the resolution clock runs again.
    pub fn set_status(&self, id: i64, status: TicketStatus) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let sql = match status {
            TicketStatus::Open => {
                "UPDATE tickets SET status = ?1, completed_at = NULL, updated_at = ?2 WHERE id = ?3"
            }
            TicketStatus::Assigned => {
                "UPDATE tickets SET status = ?1, assigned_at = ?2, updated_at = ?2 WHERE id = ?3"
            }
            TicketStatus::InProgress => {
                "UPDATE tickets SET status = ?1, contractor_accepted_at = COALESCE(contractor_accepted_at, ?2), updated_at = ?2 WHERE id = ?3"
            }
            TicketStatus::OnSite => {
                "UPDATE tickets SET status = ?1, on_site_at = COALESCE(on_site_at, ?2), updated_at = ?2 WHERE id = ?3"
            }
            TicketStatus::Completed => {
                "UPDATE tickets SET status = ?1, completed_at = ?2, updated_at = ?2 WHERE id = ?3"
            }
            TicketStatus::AwaitingApproval | TicketStatus::Closed | TicketStatus::Cancelled => {
                "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3"
            }
        };

        debug!(id, status = status.as_str(), "persisting transition");
        let rows = self.conn.execute(sql, params![status.as_str(), now, id])?;
        Ok(rows > 0)
    }

    pub fn delete_ticket(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM tickets WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    // Comments
    pub fn add_comment(&self, ticket_id: i64, author: Option<&str>, content: &str) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO comments (ticket_id, author, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, author, content, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_comments(&self, ticket_id: i64) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, author, content, created_at FROM comments WHERE ticket_id = ?1 ORDER BY created_at",
        )?;
        let comments = stmt
            .query_map([ticket_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    ticket_id: row.get(1)?,
                    author: row.get(2)?,
                    content: row.get(3)?,
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}

const TICKET_COLUMNS: &str = "id, title, description, ticket_type, priority, status, created_at, updated_at, assigned_at, contractor_accepted_at, on_site_at, completed_at, response_deadline, resolution_deadline";

fn ticket_from_row(row: &Row) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        ticket_type: parse_enum(row, 3)?,
        priority: parse_enum(row, 4)?,
        status: parse_enum(row, 5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
        assigned_at: row.get::<_, Option<String>>(8)?.map(parse_datetime),
        contractor_accepted_at: row.get::<_, Option<String>>(9)?.map(parse_datetime),
        on_site_at: row.get::<_, Option<String>>(10)?.map(parse_datetime),
        completed_at: row.get::<_, Option<String>>(11)?.map(parse_datetime),
        response_deadline: row.get::<_, Option<String>>(12)?.map(parse_datetime),
        resolution_deadline: row.get::<_, Option<String>>(13)?.map(parse_datetime),
    })
}

/// Strict enum decoding: a row with vocabulary we do not recognize is a
/// corrupt row, not a default.
fn parse_enum<T: FromStr<Err = Error>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
