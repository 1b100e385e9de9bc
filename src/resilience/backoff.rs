use std::time::Duration;

/// Exponential backoff between attempts after transient failures.
///
/// Failure `n` (1-based) waits `min_delay * 2^(n-1)`, clamped to
/// `[min_delay, max_delay]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
        }
    }

    /// Delay to wait after the `failures`-th failed attempt.
    pub fn delay(&self, failures: u32) -> Duration {
        let base = self.min_delay.as_millis() as u64;
        let cap = self.max_delay.as_millis() as u64;

        let exponent = failures.saturating_sub(1);
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay = base.saturating_mul(factor).min(cap).max(base.min(cap));

        Duration::from_millis(delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}
