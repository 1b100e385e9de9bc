//! Batch executor.

use crate::{Error, ErrorContext, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Outcome of a batch. Entries are in completion order, not input order.
#[derive(Debug, Clone)]
pub struct BatchResult<T, E> {
    pub successes: Vec<(usize, T)>,
    pub failures: Vec<(usize, E)>,
    pub execution_time: Duration,
    pub total_processed: usize,
}

impl<T, E> BatchResult<T, E> {
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
            execution_time: Duration::ZERO,
            total_processed: 0,
        }
    }
    pub fn add_success(&mut self, i: usize, r: T) {
        self.successes.push((i, r));
    }
    pub fn add_failure(&mut self, i: usize, e: E) {
        self.failures.push((i, e));
    }
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            self.successes.len() as f64 / self.total_processed as f64
        }
    }
}
impl<T, E> Default for BatchResult<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure of one batch item, rendered from the operation's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub message: String,
    pub index: usize,
}
impl BatchError {
    pub fn new(msg: impl Into<String>, idx: usize) -> Self {
        Self {
            message: msg.into(),
            index: idx,
        }
    }
}
impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Batch error at {}: {}", self.index, self.message)
    }
}
impl std::error::Error for BatchError {}

/// Runs one operation per item with a hard bound on in-flight operations.
///
/// Every item is attempted exactly once; a failing item never cancels the
/// others. All operations are driven from the caller's task, so `operation`
/// may borrow from the caller. Dropping the returned future cancels every
/// in-flight operation and releases its permit.
#[derive(Debug, Clone, Copy)]
pub struct BatchExecutor {
    concurrency: usize,
}

impl BatchExecutor {
    pub const DEFAULT_CONCURRENCY: usize = 3;

    /// Fails with a configuration error when `concurrency` is zero.
    pub fn new(concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(Error::configuration_with_context(
                "concurrency limit must be greater than 0",
                ErrorContext::new()
                    .with_field_path("batch.concurrency")
                    .with_details("got 0")
                    .with_source("batch_executor"),
            ));
        }
        Ok(Self { concurrency })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run<T, R, E, F, Fut>(&self, items: Vec<T>, operation: F) -> BatchResult<R, BatchError>
    where
        F: Fn(T, usize) -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        E: Display,
    {
        let start = Instant::now();
        let total = items.len();
        info!(
            items = total,
            concurrency = self.concurrency,
            "processing batch"
        );

        // More permits than items never changes admission.
        let permits = self
            .concurrency
            .min(total.max(1))
            .min(Semaphore::MAX_PERMITS);
        let gate = Arc::new(Semaphore::new(permits));
        let operation = &operation;

        let mut in_flight: FuturesUnordered<_> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let gate = Arc::clone(&gate);
                async move {
                    // The semaphore is never closed, so acquire cannot fail;
                    // run the item unguarded rather than drop it if it ever did.
                    let _permit = gate.acquire().await.ok();
                    (index, operation(item, index).await)
                }
            })
            .collect();

        let mut result = BatchResult::new();
        while let Some((index, outcome)) = in_flight.next().await {
            match outcome {
                Ok(r) => result.add_success(index, r),
                Err(e) => {
                    let message = e.to_string();
                    warn!(index, error = message.as_str(), "batch item failed");
                    result.add_failure(index, BatchError::new(message, index));
                }
            }
        }

        result.execution_time = start.elapsed();
        result.total_processed = total;
        info!(
            succeeded = result.success_count(),
            failed = result.failure_count(),
            duration_ms = result.execution_time.as_millis() as u64,
            "batch completed"
        );
        result
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self {
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }
}

/// Validate `concurrency` and run `operation` over `items`.
pub async fn run_batch<T, R, E, F, Fut>(
    items: Vec<T>,
    operation: F,
    concurrency: usize,
) -> Result<BatchResult<R, BatchError>>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = std::result::Result<R, E>>,
    E: Display,
{
    let executor = BatchExecutor::new(concurrency)?;
    Ok(executor.run(items, operation).await)
}
