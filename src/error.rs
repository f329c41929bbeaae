//! Error types for the reddit-saved-downloader application.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Input errors
    #[error("Invalid listing: {0}")]
    Listing(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    // Resolution errors
    #[error("Could not resolve media: {0}")]
    Resolution(String),

    // Fetch errors
    #[error("Rate limited (HTTP 429)")]
    RateLimited,

    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(StatusCode),

    #[error("No requested format available: {0}")]
    FormatUnavailable(String),

    // External tool errors
    #[error("External downloader error: {0}")]
    ExternalTool(String),

    #[error("{0} not found. Please install it and ensure it's in your PATH.")]
    ExternalToolNotFound(String),

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether the scheduler may retry the operation that produced this error.
    ///
    /// Only rate limiting and transient transport failures qualify. Any other
    /// status, resolution failure or local I/O problem is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimited => true,
            Error::Http(e) => {
                if let Some(status) = e.status() {
                    return status == StatusCode::TOO_MANY_REQUESTS;
                }
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }

    /// Whether this error aborts the run before any download is scheduled.
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Error::Listing(_)
                | Error::Authentication(_)
                | Error::Json(_)
                | Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const INTERRUPTED: i32 = 130;
}
