//! Bounded retry with linear backoff.
//!
//! One generic utility replaces the ad hoc retry-and-sleep loops that tend
//! to grow around flaky persistence calls. The save path is its only
//! production user; it exists to absorb transient contention on the output
//! file (an external reader holding a lock), not logical failures.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

/// Attempt count plus base delay. Delay grows linearly: after attempt `k`
/// the wait is `backoff * k`.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: usize, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    fn delay_after(&self, attempt: usize) -> Duration {
        self.backoff * attempt as u32
    }

    /// Run `op` until it succeeds or `attempts` is exhausted.
    ///
    /// Returns the first `Ok`, or the last `Err` once no attempts remain.
    pub async fn run<T, E, F>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    warn!(
                        "{label}: attempt {attempt}/{} failed: {e}, retrying...",
                        self.attempts
                    );
                    sleep(self.delay_after(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("{label}: failed after {} attempts: {e}", self.attempts);
                    return Err(e);
                }
            }
        }
    }
}
