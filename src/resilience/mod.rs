//! # Resilience Primitives Module
//!
//! Policies the request executor consults when an attempt does not succeed.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BackoffPolicy`] | Exponential, clamped delay between transient-failure retries |
//! | [`RateLimitPolicy`] | Wait duration for `429 Too Many Requests` (from `Retry-After`) |
//!
//! ## Transient failures
//!
//! Network errors and timeouts are retried up to the client's attempt
//! ceiling, sleeping `min * 2^(n-1)` (clamped to `max`) between attempts:
//!
//! ```rust
//! use kg_client::resilience::BackoffPolicy;
//! use std::time::Duration;
//!
//! let policy = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(10));
//! assert_eq!(policy.delay(1), Duration::from_secs(1));
//! assert_eq!(policy.delay(3), Duration::from_secs(4));
//! assert_eq!(policy.delay(9), Duration::from_secs(10));
//! ```
//!
//! ## Rate limiting
//!
//! A 429 is not a failure: the executor sleeps for the server-declared
//! `Retry-After` (default 60 s) and resubmits the same call, with no
//! ceiling on the number of resubmissions.

mod backoff;
mod rate_limit;

pub use backoff::BackoffPolicy;
pub use rate_limit::{retry_after, RateLimitPolicy, TOO_MANY_REQUESTS};
