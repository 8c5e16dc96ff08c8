//! Retry policy for transient HTTP failures.

use crate::constants::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES, TRANSIENT_STATUS_CODES,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

/// How often and how patiently transient failures are retried.
///
/// With the defaults a request is attempted up to four times, waiting 1s, 2s
/// and 4s in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// First delay; doubles on every retry.
    pub base_delay_ms: u64,
    /// Cap for a single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delays between attempts, as consumed by `tokio_retry`.
    ///
    /// `ExponentialBackoff::from_millis(2).factor(b)` yields `b*2, b*4, ...`, so the
    /// factor is half the base delay to start at exactly `base_delay_ms`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBackoff::from_millis(2)
            .factor((self.base_delay_ms / 2).max(1))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .take(self.max_retries)
    }

    /// Whether an HTTP status is worth another attempt.
    #[must_use]
    pub fn is_transient_status(status: u16) -> bool {
        TRANSIENT_STATUS_CODES.contains(&status)
    }
}
