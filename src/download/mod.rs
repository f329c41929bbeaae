//! Download module.
//!
//! This module provides:
//! - Task planning from posts
//! - Per-source resolution (direct, RedGifs, hosted video)
//! - Atomic direct fetches
//! - Retry policy with exponential backoff
//! - The bounded-concurrency scheduler
//! - Run sessions and outcome statistics

pub mod direct;
pub mod hosted;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod task;

pub use direct::fetch_to_file;
pub use hosted::{
    ExternalDownloader, ExternalOutcome, HostedVideoStrategy, YtDlp, HOSTED_VIDEO_MIN_BYTES,
};
pub use resolver::{Resolved, Resolver};
pub use retry::RetryPolicy;
pub use scheduler::Scheduler;
pub use session::DownloadSession;
pub use state::{DownloadOutcome, RunSummary};
pub use task::{plan_tasks, DownloadTask, PlannedRun};
