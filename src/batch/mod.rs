//! # Batch Execution Module
//!
//! Runs one operation per item with a hard bound on how many are in flight.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchExecutor`] | Validated concurrency limit plus the run loop |
//! | [`BatchResult`] | Successes and failures, each tagged with the input index |
//! | [`BatchError`] | Rendered failure of one item |
//!
//! ## Example
//!
//! ```rust
//! use kg_client::batch::run_batch;
//!
//! # tokio_test::block_on(async {
//! let result = run_batch(
//!     vec![2, 0, 5],
//!     |n: u32, _index| async move {
//!         if n == 0 { Err("zero") } else { Ok(10 / n) }
//!     },
//!     2,
//! )
//! .await
//! .unwrap();
//!
//! assert_eq!(result.success_count(), 2);
//! assert_eq!(result.failures[0].0, 1);
//! # });
//! ```
//!
//! A concurrency of 0 is rejected before any operation runs.

mod executor;

pub use executor::{run_batch, BatchError, BatchExecutor, BatchResult};
