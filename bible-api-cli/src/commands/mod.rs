//! Subcommand implementations

pub mod check;
pub mod migrate;
pub mod serve;

use anyhow::{Context, Result};
use clap::Args;

use bible_api_server::db::{create_pool_with_options, pool::DEFAULT_MAX_CONNECTIONS, PgPool};

pub use check::run_check;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Database connection arguments shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl DatabaseArgs {
    /// The configured URL, or an error naming how to set it
    pub fn url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")
    }

    pub async fn connect(&self) -> Result<PgPool> {
        let url = self.url()?;
        create_pool_with_options(url, self.max_connections)
            .await
            .context("Failed to connect to database")
    }
}
