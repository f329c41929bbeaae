//! HTTP API module.
//!
//! This module provides:
//! - Shared HTTP client construction
//! - RedGifs token exchange and media lookup
//! - Authenticated saved-listing pagination
//! - API response types

pub mod client;
pub mod reddit;
pub mod redgifs;
pub mod types;

pub use client::{build_client, client_from_config};
pub use reddit::{RedditApi, MAX_STALE_PAGES, PAGE_SIZE};
pub use redgifs::{extract_gif_id, RedGifsApi, QUALITY_PREFERENCE};
pub use types::*;
