//! Download outcomes and run statistics.

use std::fmt;

/// Terminal result of one download task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadOutcome {
    /// Fetched and persisted.
    Success,
    /// A valid file was already at the destination.
    SkippedAlreadyPresent,
    /// The source URL was already completed earlier in this run.
    SkippedAlreadyProcessed,
    /// Failed without further automatic retry.
    FailedTerminal,
    /// Never started because shutdown was requested.
    Cancelled,
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadOutcome::Success => write!(f, "downloaded"),
            DownloadOutcome::SkippedAlreadyPresent => write!(f, "already present"),
            DownloadOutcome::SkippedAlreadyProcessed => write!(f, "already processed"),
            DownloadOutcome::FailedTerminal => write!(f, "failed"),
            DownloadOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Statistics for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    // Per-task outcomes
    pub downloaded: u64,
    pub already_present: u64,
    pub already_processed: u64,
    pub failed: u64,
    pub cancelled: u64,

    // Planning
    pub posts_total: u64,
    pub posts_skipped: u64,
    pub posts_without_media: u64,
    pub candidates_dropped: u64,
}

impl RunSummary {
    /// Count one task outcome.
    pub fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success => self.downloaded += 1,
            DownloadOutcome::SkippedAlreadyPresent => self.already_present += 1,
            DownloadOutcome::SkippedAlreadyProcessed => self.already_processed += 1,
            DownloadOutcome::FailedTerminal => self.failed += 1,
            DownloadOutcome::Cancelled => self.cancelled += 1,
        }
    }

    /// Total number of task outcomes recorded.
    pub fn total_tasks(&self) -> u64 {
        self.downloaded + self.already_present + self.already_processed + self.failed + self.cancelled
    }

    /// Total skipped tasks.
    pub fn skipped(&self) -> u64 {
        self.already_present + self.already_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(DownloadOutcome::Success);
        summary.record(DownloadOutcome::Success);
        summary.record(DownloadOutcome::SkippedAlreadyPresent);
        summary.record(DownloadOutcome::SkippedAlreadyProcessed);
        summary.record(DownloadOutcome::FailedTerminal);
        summary.record(DownloadOutcome::Cancelled);

        assert_eq!(summary.downloaded, 2);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.total_tasks(), 6);
    }
}
