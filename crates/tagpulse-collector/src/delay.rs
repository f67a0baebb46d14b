//! Post-scroll render wait with randomized jitter.

use std::time::Duration;

use rand::Rng;

/// Wait applied after every scroll: a fixed base plus a uniformly drawn jitter.
///
/// The jitter keeps the scroll cadence off a fixed interval and gives
/// lazily rendered posts time to settle before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub base: Duration,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl DelayPolicy {
    /// Builds a policy from millisecond values. An inverted jitter range is
    /// collapsed to `jitter_min`.
    #[must_use]
    pub fn from_millis(base_ms: u64, jitter_min_ms: u64, jitter_max_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter_min: Duration::from_millis(jitter_min_ms),
            jitter_max: Duration::from_millis(jitter_max_ms.max(jitter_min_ms)),
        }
    }

    /// A policy that never waits.
    #[must_use]
    pub fn none() -> Self {
        Self::from_millis(0, 0, 0)
    }

    /// Draws the next wait duration.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.jitter_max <= self.jitter_min {
            return self.base + self.jitter_min;
        }
        let jitter = rand::rng().random_range(self.jitter_min..=self.jitter_max);
        self.base + jitter
    }

    /// Sleeps for one sampled duration. Returns immediately for a zero sample.
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::from_millis(1500, 200, 600)
    }
}
