use crate::batch::{run_batch, BatchError, BatchResult};
use crate::client::builder::KgClientBuilder;
use crate::client::config::ClientConfig;
use crate::resilience::{BackoffPolicy, RateLimitPolicy};
use crate::telemetry::{PerformanceReport, Stats, StatsAccumulator};
use crate::transport::Transport;
use crate::Result;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Client for the knowledge graph HTTP service.
///
/// One instance owns one connection pool and one statistics accumulator.
/// All operations take `&self` and may run concurrently; share the client
/// by reference or behind an `Arc`.
pub struct KgClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) stats: Arc<StatsAccumulator>,
    pub(crate) backoff: BackoffPolicy,
    pub(crate) rate_limit: RateLimitPolicy,
}

impl KgClient {
    /// Client with default settings against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        KgClientBuilder::new().base_url(base_url).build()
    }

    pub fn builder() -> KgClientBuilder {
        KgClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current counters: requests, errors, retries and total time.
    pub fn performance_snapshot(&self) -> Stats {
        self.stats.snapshot()
    }

    /// Rounded summary of [`KgClient::performance_snapshot`].
    pub fn performance_report(&self) -> PerformanceReport {
        self.stats.snapshot().report()
    }

    /// Zero every counter. Calls already in flight finish in the old
    /// generation and do not show up afterwards.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Run `operation` over `items` with at most `concurrency` in flight.
    ///
    /// The operation may borrow the client:
    ///
    /// ```rust,no_run
    /// # async fn demo(client: &kg_client::KgClient) -> kg_client::Result<()> {
    /// use kg_client::types::ProcessKnowledge;
    ///
    /// let texts = vec!["Alice leads the ML team.", "Bob reports to Alice."];
    /// let result = client
    ///     .process_batch(
    ///         texts,
    ///         |text, i| client.process_knowledge(ProcessKnowledge::new(text, format!("doc_{i}"))),
    ///         2,
    ///     )
    ///     .await?;
    /// println!("{} ok, {} failed", result.success_count(), result.failure_count());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn process_batch<T, R, E, F, Fut>(
        &self,
        items: Vec<T>,
        operation: F,
        concurrency: usize,
    ) -> Result<BatchResult<R, BatchError>>
    where
        F: Fn(T, usize) -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        E: Display,
    {
        run_batch(items, operation, concurrency).await
    }

    /// Release the connection pool. Equivalent to dropping the client.
    pub fn close(self) {
        debug!(base_url = self.config.base_url.as_str(), "closing client");
    }
}

impl Drop for KgClient {
    fn drop(&mut self) {
        let stats = self.stats.snapshot();
        debug!(
            requests = stats.requests,
            errors = stats.errors,
            retries = stats.retries,
            "client dropped"
        );
    }
}

impl std::fmt::Debug for KgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KgClient")
            .field("base_url", &self.config.base_url)
            .field("max_attempts", &self.config.max_attempts)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
