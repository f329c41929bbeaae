//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};
use regex::Regex;

/// Maximum retries accepted from configuration.
const MAX_RETRIES_LIMIT: u32 = 10;

/// Reddit username pattern: 3-20 chars, alphanumeric, hyphens, underscores.
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_-]{3,20}$";

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_source(config)?;
    validate_options(config)?;

    if !config.hosted_video.formats.iter().any(|f| !f.trim().is_empty()) {
        return Err(Error::ConfigValidation {
            field: "hosted_video.formats".to_string(),
            message: "At least one format selector is required".to_string(),
        });
    }

    Ok(())
}

/// Validate that exactly one listing source is configured.
pub fn validate_source(config: &Config) -> Result<()> {
    match (&config.input_file, &config.account.username) {
        (Some(_), Some(_)) => Err(Error::Config(
            "An input file and remote credentials are mutually exclusive".to_string(),
        )),
        (None, None) => Err(Error::MissingConfig(
            "input (pass --input FILE or --username with --session)".to_string(),
        )),
        (Some(_), None) => Ok(()),
        (None, Some(username)) => {
            validate_username(username)?;
            match config.account.session_cookie.as_deref() {
                Some(cookie) if !cookie.trim().is_empty() => Ok(()),
                _ => Err(Error::MissingConfig(
                    "session_cookie (the 'reddit_session' cookie from your browser)".to_string(),
                )),
            }
        }
    }
}

/// Validate numeric download options.
pub fn validate_options(config: &Config) -> Result<()> {
    let options = &config.options;

    if options.concurrency == 0 {
        return Err(Error::ConfigValidation {
            field: "concurrency".to_string(),
            message: "Concurrency must be at least 1".to_string(),
        });
    }

    if options.max_retries > MAX_RETRIES_LIMIT {
        return Err(Error::ConfigValidation {
            field: "max_retries".to_string(),
            message: format!(
                "At most {} retries are allowed (got {})",
                MAX_RETRIES_LIMIT, options.max_retries
            ),
        });
    }

    if options.base_delay_ms == 0 {
        return Err(Error::ConfigValidation {
            field: "base_delay_ms".to_string(),
            message: "Base delay must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// Validate a Reddit username.
pub fn validate_username(username: &str) -> Result<()> {
    let clean = clean_username(username);

    let pattern = Regex::new(USERNAME_PATTERN)
        .map_err(|e| Error::Config(format!("Invalid username pattern: {}", e)))?;

    if !pattern.is_match(clean) {
        return Err(Error::ConfigValidation {
            field: "username".to_string(),
            message: format!(
                "Username '{}' must be 3-20 characters of letters, digits, hyphens or underscores",
                username
            ),
        });
    }

    Ok(())
}

/// Strip a leading `u/` or `@` from a username.
pub fn clean_username(username: &str) -> &str {
    username.trim().trim_start_matches("u/").trim_start_matches('@')
}
