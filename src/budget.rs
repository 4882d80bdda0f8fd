//! Wall-clock budget for one invocation.

use std::time::{Duration, Instant};

/// Tracks elapsed time against a configured ceiling.
///
/// Checked once before each item is attempted, never mid-item, so an
/// in-flight interaction with the map service is never cut off halfway.
/// Stopping on the budget is a graceful condition, not an error.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudgetGuard {
    started: Instant,
    max: Duration,
}

impl TimeBudgetGuard {
    pub fn new(max: Duration) -> Self {
        Self {
            started: Instant::now(),
            max,
        }
    }

    pub fn exceeded(&self) -> bool {
        self.elapsed() >= self.max
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_exceeded_immediately() {
        let guard = TimeBudgetGuard::new(Duration::ZERO);
        assert!(guard.exceeded());
    }

    #[test]
    fn generous_budget_is_not_exceeded() {
        let guard = TimeBudgetGuard::new(Duration::from_secs(3600));
        assert!(!guard.exceeded());
    }

    #[test]
    fn elapsed_grows() {
        let guard = TimeBudgetGuard::new(Duration::from_secs(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(guard.elapsed() >= Duration::from_millis(5));
    }
}
