//! Database check command

use anyhow::{Context, Result};
use clap::Parser;

use bible_api_server::db::BibleRepo;

use super::DatabaseArgs;

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Print counts as JSON
    #[arg(long)]
    pub json: bool,
}

/// Connect, then report how much Bible text is loaded.
pub async fn run_check(args: CheckArgs) -> Result<()> {
    let pool = args.database.connect().await?;

    let stats = BibleRepo::new(&pool)
        .stats()
        .await
        .context("Failed to read text counts (has `bible-api migrate` been run?)")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Database: ok");
        println!("Books:    {}", stats.total_books);
        println!("Chapters: {}", stats.total_chapters);
        println!("Verses:   {}", stats.total_verses);
    }

    if stats.total_verses == 0 {
        tracing::warn!("No verses loaded; scripture and search endpoints will return nothing");
    }

    Ok(())
}
