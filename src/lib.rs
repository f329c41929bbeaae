//! Reddit Saved Downloader - bulk media downloader for saved Reddit posts
//!
//! This library turns a saved-posts listing into files on disk.
//!
//! # Features
//!
//! - Read an exported listing, or fetch it with a session cookie
//! - Direct images and videos, RedGifs, Reddit-hosted video via yt-dlp
//! - Bounded concurrency with retry and exponential backoff
//! - Resumable runs through a ledger of processed posts
//! - Atomic writes: partial downloads never reach the final path
//!
//! # Example
//!
//! ```no_run
//! use reddit_saved_downloader::{listing::FileListing, load_posts, Config, DownloadSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let posts = load_posts(&FileListing::new("saved_posts.json")).await?;
//!
//!     let summary = DownloadSession::new(&config)?.run(posts).await?;
//!     println!("{} downloaded, {} failed", summary.downloaded, summary.failed);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod fs;
pub mod listing;
pub mod media;
pub mod output;
pub mod shutdown;

// Re-exports for convenience
pub use config::{Config, FilenameStyle};
pub use download::{DownloadOutcome, DownloadSession, DownloadTask, RunSummary};
pub use error::{Error, Result};
pub use listing::load_posts;
pub use media::{extract, MediaCandidate, Post, SourceKind};
