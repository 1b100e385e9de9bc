//! Client-side telemetry.
//!
//! Every logical call made through a [`crate::KgClient`] is accounted in a
//! shared [`StatsAccumulator`]:
//!
//! | Counter | Incremented when |
//! |---------|------------------|
//! | `requests` | a logical call starts (once, regardless of retries) |
//! | `errors` | a call ends in failure, including cancellation |
//! | `retries` | the server answered 429 and the call was resubmitted |
//! | `total_time` | at every attempt boundary, with the wall-clock time spent |
//!
//! [`Stats`] derives the average response time and the error rate;
//! [`PerformanceReport`] is the rounded, serializable form.

mod stats;

pub use stats::{CallRecord, PerformanceReport, Stats, StatsAccumulator};
