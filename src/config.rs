use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub index_document: String,
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP gateway for browsing and serving bucket objects")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the bucket's objects (overrides BUCKET_GATEWAY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Object served at the bucket root (overrides BUCKET_GATEWAY_INDEX_DOCUMENT)
    #[arg(long)]
    pub index_document: Option<String>,

    /// Requests allowed per client per window, 0 disables the limiter
    /// (overrides BUCKET_GATEWAY_RATE_LIMIT)
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Rate-limit window in seconds (overrides BUCKET_GATEWAY_RATE_LIMIT_WINDOW)
    #[arg(long)]
    pub rate_limit_window: Option<u64>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("BUCKET_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("BUCKET_GATEWAY_PORT", 8787)?;
        let env_storage =
            env::var("BUCKET_GATEWAY_STORAGE_DIR").unwrap_or_else(|_| "./data/bucket".into());
        let env_index =
            env::var("BUCKET_GATEWAY_INDEX_DOCUMENT").unwrap_or_else(|_| "index.html".into());
        let env_rate_limit = parse_env("BUCKET_GATEWAY_RATE_LIMIT", 100)?;
        let env_rate_window = parse_env("BUCKET_GATEWAY_RATE_LIMIT_WINDOW", 60)?;

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            index_document: args.index_document.unwrap_or(env_index),
            rate_limit: args.rate_limit.unwrap_or(env_rate_limit),
            rate_limit_window_secs: args.rate_limit_window.unwrap_or(env_rate_window),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read a numeric environment variable, falling back to `default` when unset.
fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
