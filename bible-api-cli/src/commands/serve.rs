//! HTTP server command
//!
//! Resolves configuration from flags and environment, migrates the schema,
//! then runs the API until SIGTERM/Ctrl+C.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bible_api_server::auth::AuthConfig;
use bible_api_server::db::migrations;
use bible_api_server::http::{run_server, ServerConfig};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BIBLE_API_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub database: DatabaseArgs,

    /// HMAC secret used to sign session tokens
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Session lifetime in seconds
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = 3600)]
    pub token_ttl_secs: u64,

    /// Reflect any request origin in CORS responses - use with caution
    #[arg(long, env = "CORS_PERMISSIVE")]
    pub cors_permissive: bool,

    /// Allowed browser origins (comma separated; replaces the localhost defaults)
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Send the session cookie without the Secure attribute (plain-HTTP development)
    #[arg(long, env = "INSECURE_COOKIES")]
    pub insecure_cookies: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Skip schema migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

impl ServeArgs {
    /// Build the server configuration, failing on missing or unusable settings.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let secret = self
            .secret_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .context("SECRET_KEY not set. Set via --secret-key, SECRET_KEY env, or .env")?;

        if self.token_ttl_secs == 0 {
            bail!("TOKEN_TTL_SECS must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        let mut auth = AuthConfig::new(secret);
        auth.token_ttl = Duration::from_secs(self.token_ttl_secs);
        auth.secure_cookie = !self.insecure_cookies;

        let mut config = ServerConfig::new(auth);
        config.bind_addr = self.bind;
        config.cors_permissive = self.cors_permissive;
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);

        let origins: Vec<String> = self
            .cors_origins
            .iter()
            .map(|o| o.trim().to_owned())
            .filter(|o| !o.is_empty())
            .collect();
        if !origins.is_empty() {
            config.cors_origins = origins;
        }

        Ok(config)
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    // Resolve everything before touching the network
    args.database.url()?;
    let config = args.server_config()?;

    if !config.auth.secure_cookie {
        tracing::warn!("Session cookies will be sent without the Secure attribute");
    }

    let pool = args.database.connect().await?;

    if args.no_migrate {
        tracing::info!("Skipping schema migrations (--no-migrate)");
    } else {
        migrations::run(&pool)
            .await
            .context("Failed to run schema migrations")?;
    }

    tracing::info!("Starting bible-api server on {}", config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServeArgs {
        let mut argv = vec!["serve"];
        argv.extend_from_slice(args);
        ServeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_flags_build_config() {
        let args = parse(&[
            "--secret-key",
            "s3cret",
            "--bind",
            "0.0.0.0:9000",
            "--token-ttl-secs",
            "600",
            "--insecure-cookies",
            "--cors-origin",
            "https://a.example,https://b.example",
        ]);
        let config = args.server_config().unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(600));
        assert!(!config.auth.secure_cookie);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn blank_secret_is_rejected() {
        let args = parse(&["--secret-key", "  "]);
        let err = args.server_config().unwrap_err();
        assert!(err.to_string().contains("SECRET_KEY not set"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = parse(&["--secret-key", "x", "--request-timeout-secs", "0"]);
        assert!(args.server_config().is_err());
    }
}
