//! CLI entry point for parish-roster.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use parish_roster_app::{ProjectConfig, RosterService, StaticDirectory};
use parish_roster_store::FileStore;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Volunteer rosters for parish events.
#[derive(Parser, Debug)]
#[command(
    name = "parish-roster",
    version,
    about = "parish-roster: book, replace and remove event volunteers"
)]
struct Cli {
    /// Project root holding `.parish-roster/` (defaults to current).
    #[arg(long)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List people who may be offered for a slot on an event.
    Candidates {
        #[arg(long)]
        event: String,
        /// Person asking; their role picks the pool.
        #[arg(long)]
        requester: String,
        /// Ministry picked in the selector (private events).
        #[arg(long)]
        ministry: Option<String>,
        /// Keep this person selectable even when booked.
        #[arg(long)]
        keep: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Book volunteers onto an event.
    Add {
        #[arg(long)]
        event: String,
        #[arg(short = 'v', long = "volunteer", required = true)]
        volunteers: Vec<String>,
        #[arg(long)]
        assigner: String,
    },

    /// Hand a slot over to a replacement.
    Replace {
        #[arg(long)]
        event: String,
        /// Volunteer named on the slot.
        #[arg(long)]
        old: String,
        /// Incoming replacement.
        #[arg(long)]
        new: String,
        /// Outgoing replacement when the slot is already replaced.
        #[arg(long)]
        current: Option<String>,
    },

    /// Drop a volunteer or replacement from an event.
    Remove {
        #[arg(long)]
        event: String,
        #[arg(long)]
        person: String,
    },

    /// Show the slots of an event.
    Roster {
        #[arg(long)]
        event: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { root, cmd } = Cli::parse();
    install_tracing();

    let root = root.unwrap_or_else(|| PathBuf::from("."));
    execute_command(&root, cmd)
}

fn execute_command(root: &Path, command: Command) -> Result<()> {
    let config = ProjectConfig::load(root)?;
    let directory = StaticDirectory::load(config.directory_path(root))?;
    let store = FileStore::open(config.store_path(root));
    let service = RosterService::new(store, directory, config.roster.replace_strategy);
    commands::run(command, &service)
}

fn install_tracing() {
    // RUST_LOG is honoured; defaults to INFO.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
