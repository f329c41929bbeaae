//! Configuration module for the reddit-saved-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Filename style selection
//! - Configuration validation

pub mod loader;
pub mod style;
pub mod validation;

pub use loader::{
    AccountConfig, Config, HostedVideoConfig, ListingConfig, OptionsConfig, RedGifsConfig,
};
pub use style::FilenameStyle;
pub use validation::{clean_username, validate_config, validate_username};
