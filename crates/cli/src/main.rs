//! Replenish CLI - scheduler entry points and database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! replenish migrate
//!
//! # One reminder run (scheduled, e.g. daily)
//! replenish send-reminders
//!
//! # One email log cleanup pass (scheduled, e.g. nightly)
//! replenish clean-log
//! ```
//!
//! The two job subcommands are the scheduler triggers: they take no
//! arguments and the jobs themselves never fail the process. A non-zero
//! exit only means setup failed before the job started (bad environment
//! configuration or an unreachable database).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "replenish")]
#[command(author, version, about = "Replenish repurchase reminder jobs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Scan recent orders and send repurchase reminder emails
    SendReminders,
    /// Delete email log entries older than the retention window
    CleanLog,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::SendReminders => commands::jobs::send_reminders().await?,
        Commands::CleanLog => commands::jobs::clean_log().await?,
    }
    Ok(())
}
