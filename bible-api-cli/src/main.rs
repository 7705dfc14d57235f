//! bible-api CLI - run and maintain the Bible API server
//!
//! Subcommands:
//! - `serve`: run the HTTP API (migrates the schema first unless told not to)
//! - `migrate`: create or update the database schema
//! - `check`: verify database connectivity and report loaded text counts

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "bible-api",
    author,
    version,
    about = "HTTP API for Bible text, verse search and devotional journaling",
    long_about = "Serve books, chapters and verses with full-text search, cookie-based \
                  accounts, and daily devotionals with favorite verses, backed by PostgreSQL."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Check database connectivity and report loaded text counts
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values from a .env file never override variables already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Check(args) => commands::run_check(args).await?,
    }

    Ok(())
}
