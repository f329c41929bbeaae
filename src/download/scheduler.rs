//! Bounded-concurrency download scheduler.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::dedup::CompletedUrls;
use crate::download::hosted::HOSTED_VIDEO_MIN_BYTES;
use crate::download::resolver::Resolver;
use crate::download::retry::RetryPolicy;
use crate::download::state::DownloadOutcome;
use crate::download::task::DownloadTask;
use crate::fs::{display_name, has_valid_file};
use crate::media::SourceKind;
use crate::output::{NoopReporter, SharedProgressReporter};
use crate::shutdown::{SharedShutdown, ShutdownCoordinator};

/// Runs download tasks with at most `concurrency` fetches in flight.
pub struct Scheduler {
    resolver: Arc<Resolver>,
    completed: CompletedUrls,
    slots: Arc<Semaphore>,
    retry: RetryPolicy,
    reporter: SharedProgressReporter,
    shutdown: SharedShutdown,
}

impl Scheduler {
    pub fn new(resolver: Resolver, completed: CompletedUrls, concurrency: usize) -> Self {
        Self {
            resolver: Arc::new(resolver),
            completed,
            slots: Arc::new(Semaphore::new(concurrency.max(1))),
            retry: RetryPolicy::default(),
            reporter: Arc::new(NoopReporter),
            shutdown: ShutdownCoordinator::shared(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_reporter(mut self, reporter: SharedProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run every task to a terminal outcome.
    ///
    /// Outcomes are returned in task order; completion order is unspecified.
    pub async fn run(&self, tasks: &[DownloadTask]) -> Vec<DownloadOutcome> {
        self.reporter.start(tasks.len() as u64);
        let outcomes = join_all(tasks.iter().map(|task| self.run_task(task))).await;
        self.reporter.finish();
        outcomes
    }

    /// Run one task and report its outcome.
    pub async fn run_task(&self, task: &DownloadTask) -> DownloadOutcome {
        let outcome = self.execute(task).await;
        self.reporter.advance(task, outcome);
        outcome
    }

    async fn execute(&self, task: &DownloadTask) -> DownloadOutcome {
        let url = task.url();
        let name = display_name(&task.destination);

        // 1. Completed earlier in this run
        if self.completed.contains(url).await {
            tracing::debug!("Already processed URL: {}", url);
            return DownloadOutcome::SkippedAlreadyProcessed;
        }

        // 2. Already on disk
        let min_bytes = match task.candidate.source_kind {
            SourceKind::HostedVideo => HOSTED_VIDEO_MIN_BYTES,
            _ => 1,
        };
        if has_valid_file(&task.destination, min_bytes).await {
            tracing::debug!("Skipping existing file: {}", task.destination.display());
            self.completed.mark(url).await;
            return DownloadOutcome::SkippedAlreadyPresent;
        }

        let mut attempt: u32 = 0;
        let mut selector: usize = 0;

        loop {
            // 3. Wait for a slot unless shutting down
            let permit = tokio::select! {
                biased;
                _ = self.shutdown.wait_for_shutdown() => {
                    tracing::debug!("Cancelled before start: {}", name);
                    return DownloadOutcome::Cancelled;
                }
                permit = self.slots.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return DownloadOutcome::Cancelled,
                },
            };

            // 4-5. Resolve, fetch, persist
            let result = self.resolver.fetch(task, &mut selector).await;
            drop(permit);

            match result {
                Ok(()) => {
                    self.completed.mark(url).await;
                    tracing::info!("Downloaded: {}", task.destination.display());
                    return DownloadOutcome::Success;
                }
                Err(e) if e.is_retryable() && self.retry.can_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        "{}: {} (retry {}/{} in {:.1}s)",
                        name,
                        e,
                        attempt + 1,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    self.reporter.retrying(task, attempt + 1, delay);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.shutdown.wait_for_shutdown() => {}
                    }
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to download {} from {}: {}", name, url, e);
                    return DownloadOutcome::FailedTerminal;
                }
            }
        }
    }
}
