//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use bible_api_server::db::migrations;

use super::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create or update the schema. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let pool = args.database.connect().await?;

    migrations::run(&pool)
        .await
        .context("Failed to run schema migrations")?;

    println!("Schema is up to date");
    Ok(())
}
