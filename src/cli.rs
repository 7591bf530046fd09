//! Command-line interface parsing for Postboard
//!
//! This module handles parsing of CLI arguments using clap. Every option can
//! also be set through a `POSTBOARD_*` environment variable.

use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::data::DEFAULT_BASE_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The base URL is not an http(s) URL with a host
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL with a host")]
    InvalidBaseUrl(String),

    /// A zero timeout would fail every request
    #[error("Invalid timeout: must be greater than 0 ms")]
    InvalidTimeout,

    /// `--list` and `--clear-cache` cannot be combined
    #[error("--list and --clear-cache cannot be used together")]
    ConflictingModes,
}

/// Postboard - browse posts with offline caching
#[derive(Parser, Debug)]
#[command(name = "postboard")]
#[command(about = "Browse posts from a REST API, with an offline cache")]
#[command(version)]
pub struct Cli {
    /// Base URL of the posts API
    #[arg(long, env = "POSTBOARD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "POSTBOARD_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Directory for the offline cache (defaults to the XDG cache directory)
    #[arg(long, env = "POSTBOARD_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Write logs to this file (defaults to postboard.log in the cache directory)
    #[arg(long, env = "POSTBOARD_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Start on the dashboard without signing in
    #[arg(long)]
    pub skip_login: bool,

    /// Run one fetch cycle without the TUI and print the result
    #[arg(long)]
    pub list: bool,

    /// Remove the cached posts and exit
    #[arg(long)]
    pub clear_cache: bool,
}

/// What the binary should do after parsing arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Interactive terminal UI
    #[default]
    Interactive,
    /// Single headless fetch cycle
    List,
    /// Clear the cache and exit
    ClearCache,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// Whether to skip the login screen
    pub skip_login: bool,
    pub mode: RunMode,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: crate::data::DEFAULT_TIMEOUT,
            cache_dir: None,
            log_file: None,
            skip_login: false,
            mode: RunMode::Interactive,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if a value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = cli.base_url.trim().to_string();
        let has_host = Url::parse(&base_url)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false);
        if !has_host {
            return Err(CliError::InvalidBaseUrl(base_url));
        }
        if cli.timeout_ms == 0 {
            return Err(CliError::InvalidTimeout);
        }

        let mode = match (cli.list, cli.clear_cache) {
            (true, true) => return Err(CliError::ConflictingModes),
            (true, false) => RunMode::List,
            (false, true) => RunMode::ClearCache,
            (false, false) => RunMode::Interactive,
        };

        Ok(StartupConfig {
            base_url,
            timeout: Duration::from_millis(cli.timeout_ms),
            cache_dir: cli.cache_dir.clone(),
            log_file: cli.log_file.clone(),
            skip_login: cli.skip_login,
            mode,
        })
    }
}
