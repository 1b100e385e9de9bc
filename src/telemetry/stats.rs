//! Client-side performance statistics.
//!
//! Counters are plain atomics so concurrent calls never contend on a lock.
//! A reset swaps in a fresh generation of counters instead of zeroing the
//! old ones in place, so readers never observe a half-reset state.

use arc_swap::ArcSwap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Point-in-time copy of the accumulated statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Logical calls started (retries and resubmissions excluded).
    pub requests: u64,
    /// Logical calls whose final outcome was a failure.
    pub errors: u64,
    /// Rate-limit-induced resubmissions.
    pub retries: u64,
    /// Wall-clock time spent across every attempt of every call.
    pub total_time: Duration,
}

impl Stats {
    /// `total_time / requests`, zero before the first request.
    pub fn average_response_time(&self) -> Duration {
        if self.requests == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.total_time.as_secs_f64() / self.requests as f64)
        }
    }

    /// Percentage of requests that failed, zero before the first request.
    pub fn error_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.errors as f64 / self.requests as f64 * 100.0
        }
    }

    pub fn report(&self) -> PerformanceReport {
        PerformanceReport::from(*self)
    }
}

/// Rounded, serializable summary of [`Stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_retries: u64,
    /// Milliseconds, one decimal.
    pub average_response_time_ms: f64,
    /// Percent, two decimals.
    pub error_rate: f64,
    /// Seconds, two decimals.
    pub total_time_secs: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

impl From<Stats> for PerformanceReport {
    fn from(stats: Stats) -> Self {
        Self {
            total_requests: stats.requests,
            total_errors: stats.errors,
            total_retries: stats.retries,
            average_response_time_ms: round_to(
                stats.average_response_time().as_secs_f64() * 1000.0,
                1,
            ),
            error_rate: round_to(stats.error_rate(), 2),
            total_time_secs: round_to(stats.total_time.as_secs_f64(), 2),
        }
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Requests: {}", self.total_requests)?;
        writeln!(f, "Total Errors: {}", self.total_errors)?;
        writeln!(f, "Total Retries: {}", self.total_retries)?;
        writeln!(f, "Average Response Time: {} ms", self.average_response_time_ms)?;
        writeln!(f, "Error Rate: {}%", self.error_rate)?;
        write!(f, "Total Time: {} s", self.total_time_secs)
    }
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    retries: AtomicU64,
    total_time_nanos: AtomicU64,
}

impl Counters {
    fn add_time(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_time_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn snapshot(&self) -> Stats {
        Stats {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            total_time: Duration::from_nanos(self.total_time_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// Thread-safe accumulator shared by every in-flight call of one client.
#[derive(Debug)]
pub struct StatsAccumulator {
    current: ArcSwap<Counters>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Counters::default()),
        }
    }

    /// Count one new logical request.
    pub fn record_request(&self) {
        self.current.load().requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one attempt's duration and whether it was a rate-limit
    /// resubmission and/or a terminal failure.
    pub fn record(&self, duration: Duration, is_retry: bool, is_error: bool) {
        let counters = self.current.load();
        counters.add_time(duration);
        if is_retry {
            counters.retries.fetch_add(1, Ordering::Relaxed);
        }
        if is_error {
            counters.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Stats {
        self.current.load().snapshot()
    }

    /// Replace all counters with zeroes in one step.
    pub fn reset(&self) {
        self.current.store(Arc::new(Counters::default()));
    }

    /// Start tracking one logical call. Increments `requests` immediately.
    pub fn begin_call(&self) -> CallRecord {
        let counters = self.current.load_full();
        counters.requests.fetch_add(1, Ordering::Relaxed);
        CallRecord {
            counters,
            mark: Instant::now(),
            succeeded: false,
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call guard that feeds the accumulator as the call progresses.
///
/// Elapsed time is flushed at every attempt boundary, so an abandoned call
/// has already contributed whatever it spent. Dropping the record without
/// [`CallRecord::succeed`] counts the call as an error, which covers explicit
/// failures and cancellation alike. The record stays bound to the counter
/// generation it started in; a concurrent reset does not split one call
/// across two generations.
#[derive(Debug)]
pub struct CallRecord {
    counters: Arc<Counters>,
    mark: Instant,
    succeeded: bool,
}

impl CallRecord {
    /// Flush time spent since the previous checkpoint.
    pub fn checkpoint(&mut self) {
        let now = Instant::now();
        self.counters.add_time(now.saturating_duration_since(self.mark));
        self.mark = now;
    }

    /// Count one rate-limit resubmission.
    pub fn record_retry(&mut self) {
        self.counters.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeed(mut self) {
        self.succeeded = true;
    }

    pub fn fail(self) {}
}

impl Drop for CallRecord {
    fn drop(&mut self) {
        self.checkpoint();
        if !self.succeeded {
            self.counters.errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}
