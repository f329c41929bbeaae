//! Progress reporting.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::download::{DownloadOutcome, DownloadTask};
use crate::fs::display_name;

/// Receives one event per terminal task outcome.
pub trait ProgressReporter: Send + Sync {
    /// Called once before any task runs.
    fn start(&self, total: u64);

    /// Called exactly once per task, with its terminal outcome.
    fn advance(&self, task: &DownloadTask, outcome: DownloadOutcome);

    /// Called before each backoff sleep; `attempt` is the 1-based retry number.
    fn retrying(&self, _task: &DownloadTask, _attempt: u32, _delay: Duration) {}

    /// Called once after every task finished.
    fn finish(&self);
}

pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&self, _total: u64) {}
    fn advance(&self, _task: &DownloadTask, _outcome: DownloadOutcome) {}
    fn finish(&self) {}
}

/// Item-count progress bar on stderr.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new(message: &str) -> Self {
        Self {
            bar: create_item_bar(0, message),
        }
    }
}

impl ProgressReporter for BarReporter {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, task: &DownloadTask, outcome: DownloadOutcome) {
        if outcome == DownloadOutcome::Success {
            self.bar.set_message(display_name(&task.destination));
        }
        self.bar.inc(1);
    }

    fn retrying(&self, task: &DownloadTask, attempt: u32, delay: Duration) {
        self.bar.set_message(format!(
            "retry {} of {} in {:.1}s",
            attempt,
            display_name(&task.destination),
            delay.as_secs_f64()
        ));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Create a progress bar for item counts.
pub fn create_item_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let template = format!(
        "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{wide_msg:.dim}}",
        message
    );
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
