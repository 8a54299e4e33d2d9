//! Publish throttle.
//!
//! At most one update per minimum interval. Updates arriving inside the
//! window are dropped, not queued.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    min_interval: Duration,
    last_publish: Option<Instant>,
}

impl UpdateThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_publish: None,
        }
    }

    /// Returns true (and records `now`) if an update may be published.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last_publish {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last_publish = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_publish = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_passes() {
        let mut throttle = UpdateThrottle::new(Duration::from_secs(1));
        assert!(throttle.try_acquire(Instant::now()));
    }

    #[test]
    fn test_updates_inside_window_are_dropped() {
        let mut throttle = UpdateThrottle::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(throttle.try_acquire(t0));
        assert!(!throttle.try_acquire(t0 + Duration::from_millis(100)));
        assert!(!throttle.try_acquire(t0 + Duration::from_millis(999)));
        assert!(throttle.try_acquire(t0 + Duration::from_millis(1_000)));
        // Window restarts from the last accepted update.
        assert!(!throttle.try_acquire(t0 + Duration::from_millis(1_500)));
        assert!(throttle.try_acquire(t0 + Duration::from_millis(2_000)));
    }

    #[test]
    fn test_reset_opens_window() {
        let mut throttle = UpdateThrottle::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(throttle.try_acquire(t0));
        throttle.reset();
        assert!(throttle.try_acquire(t0 + Duration::from_millis(10)));
    }
}
