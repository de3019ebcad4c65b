//! Retry policy for outbound fetches
//!
//! Exponential backoff with optional additive jitter. Only the Fetcher
//! consults this; the pipeline as a whole never retries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::defaults;

/// Retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt (milliseconds)
    pub base_delay_ms: u64,
    /// Upper bound for the exponential part (milliseconds)
    pub max_delay_ms: u64,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
    /// Uniform jitter added on top of each delay, `0..=jitter_ms`
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_ATTEMPTS,
            base_delay_ms: defaults::BASE_DELAY_MS,
            max_delay_ms: defaults::MAX_DELAY_MS,
            backoff_multiplier: defaults::BACKOFF_MULTIPLIER,
            jitter_ms: defaults::JITTER_MS,
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempts_made` attempts
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Backoff before the attempt following attempt number `attempt` (1-based)
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let exponential = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = if exponential.is_finite() {
            (exponential as u64).min(self.max_delay_ms)
        } else {
            self.max_delay_ms
        };

        let jitter = if self.jitter_ms > 0 {
            fastrand::u64(0..=self.jitter_ms)
        } else {
            0
        };

        Duration::from_millis(capped.saturating_add(jitter))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_attempts >= 1, "retry.max_attempts must be at least 1");
        anyhow::ensure!(
            self.backoff_multiplier >= 1.0,
            "retry.backoff_multiplier must be >= 1.0, got {}",
            self.backoff_multiplier
        );
        anyhow::ensure!(
            self.base_delay_ms <= self.max_delay_ms,
            "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
            self.base_delay_ms,
            self.max_delay_ms
        );
        Ok(())
    }
}
