//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::{Error, Result};

/// Build the HTTP client shared by every request of a run.
///
/// `reqwest::Client` is internally reference counted, so clones handed to
/// concurrent tasks share one connection pool.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .cookie_store(true)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Build the HTTP client described by a configuration.
pub fn client_from_config(config: &Config) -> Result<Client> {
    build_client(&config.options.user_agent, config.request_timeout())
}
