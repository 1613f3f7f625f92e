//! Fixed-interval request pacing
//!
//! Applied between sequential dependent requests. The pause suspends the
//! whole fetch loop, not just the next request: nothing else in the loop runs
//! until the delay has elapsed.

use std::time::Duration;
use tracing::debug;

/// Delay the reference CoinGecko integration waits between markets
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(15);

/// Waits a fixed delay after each paced request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Pacer that never waits (tests, exchanges without limits)
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspend the caller for the configured delay.
    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!("Pacing: sleeping {:?} before next request", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_default_delay() {
        assert_eq!(Pacer::default().delay(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_full_delay() {
        let pacer = Pacer::new(Duration::from_secs(15));
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_pacer_returns_immediately() {
        let start = Instant::now();
        Pacer::disabled().pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
