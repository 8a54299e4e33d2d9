//! Reconnect backoff.
//!
//! Delay doubles on every consecutive failure, starting at the floor and
//! never exceeding the ceiling. A successful connection resets it.

use std::time::Duration;

/// Exponential reconnect delay.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base_ms: u64,
    max_ms: u64,
    /// Consecutive failures since the last successful connection.
    attempts: u32,
}

impl ReconnectBackoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms: max_ms.max(base_ms),
            attempts: 0,
        }
    }

    /// Delay for the n-th consecutive failure (1-based).
    ///
    /// attempt=1 -> base, attempt=2 -> 2*base, attempt=3 -> 4*base, ...
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_ms))
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        self.delay_for_attempt(self.attempts)
    }

    /// Back to the floor after a successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(1_000, 30_000)
    }
}
