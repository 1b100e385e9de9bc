//! # kg-client
//!
//! Resilient async client for the Knowledge Graph HTTP API.
//!
//! ## Overview
//!
//! Every operation goes through one request executor that:
//!
//! - retries network failures and timeouts with exponential backoff
//!   (1 s, 2 s, 4 s ... capped at 10 s) up to a fixed attempt ceiling,
//! - waits out `429 Too Many Requests` for the server-declared
//!   `Retry-After` and resubmits, without consuming an attempt,
//! - turns the `{success, data, error}` envelope into a typed [`Error`],
//! - accounts requests, errors, retries and wall-clock time in a shared
//!   [`telemetry::StatsAccumulator`].
//!
//! Bulk work runs through [`batch::BatchExecutor`], which bounds the number
//! of in-flight operations and isolates per-item failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kg_client::types::{ProcessKnowledge, SearchOptions};
//! use kg_client::KgClient;
//!
//! #[tokio::main]
//! async fn main() -> kg_client::Result<()> {
//!     let client = KgClient::builder()
//!         .base_url("http://localhost:3000/api")
//!         .from_env()
//!         .build()?;
//!
//!     client
//!         .process_knowledge(ProcessKnowledge::new("Alice leads the ML team.", "notes"))
//!         .await?;
//!     let hits = client
//!         .search_knowledge("who leads ML?", SearchOptions::new().limit(5))
//!         .await?;
//!     println!("{hits}");
//!     println!("{}", client.performance_report());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client facade, builder, configuration and request executor |
//! | [`protocol`] | Request descriptions and the response envelope |
//! | [`transport`] | Transport seam and the reqwest implementation |
//! | [`resilience`] | Backoff and rate-limit policies |
//! | [`batch`] | Bounded-concurrency batch execution |
//! | [`telemetry`] | Client-side performance statistics |
//! | [`types`] | Typed operation arguments |

pub mod batch;
pub mod client;
pub mod protocol;
pub mod resilience;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use batch::{BatchError, BatchExecutor, BatchResult};
pub use client::{ClientConfig, KgClient, KgClientBuilder};
pub use protocol::{HttpMethod, RequestSpec};
pub use telemetry::{PerformanceReport, Stats};
pub use transport::{Transport, TransportError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
