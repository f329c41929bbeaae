//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::Config;

/// Default retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff base.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default jitter ceiling.
pub const DEFAULT_JITTER: Duration = Duration::from_secs(1);

/// Largest exponent applied to the base delay.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// How often and how long to wait before retrying a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed beyond the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the random delay added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.options.max_retries,
            base_delay: config.base_delay(),
            jitter: config.jitter(),
        }
    }

    /// Whether another attempt is allowed after `attempt` (0-based) failed.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Deterministic part of the delay: `base_delay * 2^attempt`.
    pub fn min_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(factor)
    }

    /// Delay before retrying after `attempt` (0-based) failed.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            self.jitter.mul_f64(rand::thread_rng().gen_range(0.0..1.0))
        };
        self.min_delay(attempt) + jitter
    }
}
