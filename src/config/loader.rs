//! Configuration structures and loading logic.

use crate::config::style::FilenameStyle;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub redgifs: RedGifsConfig,

    #[serde(default)]
    pub hosted_video: HostedVideoConfig,

    #[serde(default)]
    pub listing: ListingConfig,

    /// Saved listing file to read. Not persisted; set from the command line.
    #[serde(skip)]
    pub input_file: Option<PathBuf>,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Directory where media and the resume ledger are written.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Maximum number of simultaneous fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Filename style (basic, pretty, advanced).
    #[serde(default)]
    pub filename_style: FilenameStyle,

    /// Retries allowed after the first attempt of a task.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound of the random jitter added to each backoff, in milliseconds.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User agent sent with every HTTP request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Process the listing oldest-first.
    #[serde(default = "default_true")]
    pub reverse_order: bool,

    /// Remove zero-byte and `.tmp` leftovers before planning.
    #[serde(default = "default_true")]
    pub cleanup_incomplete: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            concurrency: default_concurrency(),
            filename_style: FilenameStyle::default(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            jitter_ms: default_jitter_ms(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
            reverse_order: true,
            cleanup_incomplete: true,
        }
    }
}

/// Credentials for fetching the saved listing directly from Reddit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Reddit username whose saved listing is fetched.
    #[serde(default)]
    pub username: Option<String>,

    /// Value of the `reddit_session` cookie.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

/// RedGifs API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedGifsConfig {
    #[serde(default = "default_redgifs_api")]
    pub api_base: String,
}

impl Default for RedGifsConfig {
    fn default() -> Self {
        Self {
            api_base: default_redgifs_api(),
        }
    }
}

/// External hosted-video downloader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedVideoConfig {
    /// Program invoked for hosted videos.
    #[serde(default = "default_hosted_program")]
    pub program: String,

    /// Format selectors, tried in order.
    #[serde(default = "default_hosted_formats")]
    pub formats: Vec<String>,

    /// Timeout for a single invocation, in seconds.
    #[serde(default = "default_hosted_timeout")]
    pub timeout_secs: u64,
}

impl Default for HostedVideoConfig {
    fn default() -> Self {
        Self {
            program: default_hosted_program(),
            formats: default_hosted_formats(),
            timeout_secs: default_hosted_timeout(),
        }
    }
}

/// Remote listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_listing_api")]
    pub api_base: String,

    /// Delay between listing pages, in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Where the fetched listing is written.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            api_base: default_listing_api(),
            page_delay_ms: default_page_delay_ms(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_concurrency() -> usize {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_jitter_ms() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    concat!("reddit-saved-downloader/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

fn default_redgifs_api() -> String {
    "https://api.redgifs.com".to_string()
}

fn default_hosted_program() -> String {
    "yt-dlp".to_string()
}

fn default_hosted_formats() -> Vec<String> {
    vec![
        "best[height<=720]".to_string(),
        "best[height<=480]".to_string(),
        "worst".to_string(),
        "best".to_string(),
    ]
}

fn default_hosted_timeout() -> u64 {
    600
}

fn default_listing_api() -> String {
    "https://www.reddit.com".to_string()
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from("saved_posts.json")
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Base delay for retry backoff.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.options.base_delay_ms)
    }

    /// Jitter ceiling for retry backoff.
    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.options.jitter_ms)
    }

    /// Timeout applied to each HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.options.request_timeout_secs)
    }

    /// Whether the listing comes from Reddit rather than a local file.
    pub fn uses_remote_listing(&self) -> bool {
        self.input_file.is_none() && self.account.username.is_some()
    }
}
