//! Causeway CLI - nonprofit operations in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{history, import, status};

/// Causeway - nonprofit operations in your terminal
#[derive(Parser)]
#[command(name = "cw", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import records from a CSV file
    Import {
        /// Path to CSV file
        file: Option<PathBuf>,
        /// Entity to import: donor, partner, or company
        #[arg(long)]
        entity: Option<String>,
        /// Import duplicate rows as new records
        #[arg(long)]
        allow_duplicates: bool,
        /// Validate and de-duplicate without writing
        #[arg(long)]
        dry_run: bool,
        /// Write the per-row error log to this file
        #[arg(long)]
        error_log: Option<PathBuf>,
        /// Use saved import profile
        #[arg(long)]
        profile: Option<String>,
        /// Save settings as profile
        #[arg(long)]
        save_profile: Option<String>,
        /// List saved profiles
        #[arg(long)]
        list_profiles: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stored record counts and recent activity
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent import runs
    History {
        /// Number of runs to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import {
            file,
            entity,
            allow_duplicates,
            dry_run,
            error_log,
            profile,
            save_profile,
            list_profiles,
            json,
        } => import::run(
            file,
            entity,
            allow_duplicates,
            dry_run,
            error_log,
            profile,
            save_profile,
            list_profiles,
            json,
        ),
        Commands::Status { json } => status::run(json),
        Commands::History { limit, json } => history::run(limit, json),
    }
}
