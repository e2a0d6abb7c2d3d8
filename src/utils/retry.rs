//! Backoff policy and retry bookkeeping for the sync loop
//!
//! The loop never gives up: a failed cycle only pushes the next allowed
//! attempt further out. Delays grow exponentially from `base_delay` and are
//! capped both by exponent and by `max_delay`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Largest accepted `max_delay_secs`, one day
pub const MAX_BACKOFF_DELAY_SECS: u64 = 86_400;

/// Roughly 30 years, used when `now + delay` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Configuration for backoff behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay after the first consecutive failure, in seconds
    pub base_delay_secs: u64,

    /// Upper bound for any delay, in seconds
    pub max_delay_secs: u64,

    /// Largest exponent applied to the base delay
    pub max_exponent: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_secs: 15,
            max_delay_secs: 600,
            max_exponent: 6,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy with custom delays
    pub fn with_delays(base_delay_secs: u64, max_delay_secs: u64) -> Self {
        Self {
            base_delay_secs,
            max_delay_secs,
            ..Default::default()
        }
    }

    /// Delay before the next attempt after `failures` consecutive failures
    ///
    /// Zero failures means no delay. The sequence is non-decreasing and
    /// strictly increasing until one of the caps is reached.
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let exponent = (failures - 1).min(self.max_exponent).min(31);
        let delay_secs = self
            .base_delay_secs
            .saturating_mul(1_u64 << exponent)
            .min(self.max_delay_secs);

        Duration::from_secs(delay_secs)
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.base_delay_secs == 0 {
            return Err("base_delay_secs must be greater than 0".to_string());
        }
        if self.max_delay_secs < self.base_delay_secs {
            return Err("max_delay_secs must not be lower than base_delay_secs".to_string());
        }
        if self.max_delay_secs > MAX_BACKOFF_DELAY_SECS {
            return Err(format!(
                "max_delay_secs must not exceed {MAX_BACKOFF_DELAY_SECS} (one day)"
            ));
        }
        Ok(())
    }
}

/// Consecutive-failure counter and the earliest time the next attempt may run
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    failures: u32,
    next_attempt_at: Option<Instant>,
}

impl RetryState {
    /// Create a fresh state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of consecutive failures
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Earliest instant at which another attempt is allowed, if backing off
    pub fn next_attempt_at(&self) -> Option<Instant> {
        self.next_attempt_at
    }

    /// Whether the loop is currently backing off
    pub fn is_backing_off(&self) -> bool {
        self.next_attempt_at.is_some()
    }

    /// Record a failure observed at `now` and return the delay that was applied
    pub fn record_failure(&mut self, policy: &BackoffPolicy, now: Instant) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let delay = policy.delay_for(self.failures);
        let at = now
            .checked_add(delay)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.next_attempt_at = Some(at);
        delay
    }

    /// Record a success, clearing the counter
    pub fn record_success(&mut self) {
        self.failures = 0;
        self.next_attempt_at = None;
    }
}
