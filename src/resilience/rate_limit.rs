use crate::transport::RawResponse;
use std::time::Duration;

/// HTTP status the server uses to ask the client to slow down.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// How long to wait when the server answers 429.
///
/// There is no ceiling on the number of waits: the client keeps honouring
/// the server for as long as it keeps rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Used when `Retry-After` is absent or not an integer number of seconds.
    pub default_wait: Duration,
}

impl RateLimitPolicy {
    pub fn new(default_wait: Duration) -> Self {
        Self { default_wait }
    }

    pub fn is_rate_limited(response: &RawResponse) -> bool {
        response.status == TOO_MANY_REQUESTS
    }

    /// Server-declared wait for a 429 response.
    pub fn wait_for(&self, response: &RawResponse) -> Duration {
        retry_after(response).unwrap_or(self.default_wait)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            default_wait: Duration::from_secs(60),
        }
    }
}

/// Best-effort parsing of `Retry-After`.
///
/// Only the `Retry-After: <seconds>` form is supported; HTTP dates fall back
/// to the policy default.
pub fn retry_after(response: &RawResponse) -> Option<Duration> {
    let raw = response.header_first(&["retry-after"])?;
    let secs: u64 = raw.parse().ok()?;
    Some(Duration::from_secs(secs))
}
