use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ticktrack::commands;
use ticktrack::db::Database;

#[derive(Parser)]
#[command(name = "ticktrack")]
#[command(about = "A lean helpdesk ticket tracker CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ticktrack in the current directory
    Init,

    /// Create a new ticket
    Create {
        /// Ticket title
        title: String,
        /// Ticket description
        #[arg(short, long)]
        description: Option<String>,
        /// Priority (low, medium, high, critical)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Category (maintenance, billing, access, general)
        #[arg(short = 't', long = "type", default_value = "general")]
        ticket_type: String,
    },

    /// List tickets
    List {
        /// Filter by status (a status name, "active", or "all")
        #[arg(short, long, default_value = "active")]
        status: String,
        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,
        /// Filter by category
        #[arg(short = 't', long = "type")]
        ticket_type: Option<String>,
        /// Only tickets with a breached SLA phase
        #[arg(long)]
        breached: bool,
    },

    /// Show ticket details with SLA state and timeline
    Show {
        /// Ticket ID
        id: i64,
    },

    /// Update a ticket; a priority change recomputes its SLA deadlines
    Update {
        /// Ticket ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New category
        #[arg(short = 't', long = "type")]
        ticket_type: Option<String>,
    },

    /// Move a ticket to a new status, checked against the workflow table
    Transition {
        /// Ticket ID
        id: i64,
        /// Target status
        status: String,
        /// Role performing the transition
        #[arg(short, long, env = "TICKTRACK_ROLE")]
        role: String,
    },

    /// List workflow actions available to a role on a ticket
    Actions {
        /// Ticket ID
        id: i64,
        /// Role to check
        #[arg(short, long, env = "TICKTRACK_ROLE")]
        role: String,
    },

    /// Add a comment to a ticket
    Comment {
        /// Ticket ID
        id: i64,
        /// Comment text
        text: String,
        /// Comment author
        #[arg(short, long)]
        author: Option<String>,
    },

    /// SLA board for all active tickets
    Sla,

    /// Export tickets with their SLA state
    Export {
        /// Output format (json, markdown)
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Delete a ticket
    Delete {
        /// Ticket ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

fn find_ticktrack_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(".ticktrack");
        if candidate.exists() && candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a ticktrack directory (or any parent). Run 'ticktrack init' first.");
        }
    }
}

fn get_db() -> Result<Database> {
    let ticktrack_dir = find_ticktrack_dir()?;
    let db_path = ticktrack_dir.join("tickets.db");
    Database::open(&db_path).context("Failed to open database")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd)
        }

        Commands::Create {
            title,
            description,
            priority,
            ticket_type,
        } => {
            let db = get_db()?;
            commands::create::run(&db, &title, description.as_deref(), &priority, &ticket_type)
        }

        Commands::List {
            status,
            priority,
            ticket_type,
            breached,
        } => {
            let db = get_db()?;
            commands::list::run(
                &db,
                &status,
                priority.as_deref(),
                ticket_type.as_deref(),
                breached,
            )
        }

        Commands::Show { id } => {
            let db = get_db()?;
            commands::show::run(&db, id)
        }

        Commands::Update {
            id,
            title,
            description,
            priority,
            ticket_type,
        } => {
            let db = get_db()?;
            commands::update::run(
                &db,
                id,
                title.as_deref(),
                description.as_deref(),
                priority.as_deref(),
                ticket_type.as_deref(),
            )
        }

        Commands::Transition { id, status, role } => {
            let db = get_db()?;
            commands::transition::run(&db, id, &status, &role)
        }

        Commands::Actions { id, role } => {
            let db = get_db()?;
            commands::actions::run(&db, id, &role)
        }

        Commands::Comment { id, text, author } => {
            let db = get_db()?;
            commands::comment::run(&db, id, &text, author.as_deref())
        }

        Commands::Sla => {
            let db = get_db()?;
            commands::sla::run(&db)
        }

        Commands::Export { format, output } => {
            let db = get_db()?;
            match format.to_ascii_lowercase().as_str() {
                "json" => commands::export::run_json(&db, output.as_deref()),
                "markdown" | "md" => commands::export::run_markdown(&db, output.as_deref()),
                other => bail!("Unknown export format '{}'. Use json or markdown.", other),
            }
        }

        Commands::Delete { id, force } => {
            let db = get_db()?;
            commands::delete::run(&db, id, force)
        }
    }
}
