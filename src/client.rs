//! Knowledge graph client.
//!
//! Keep the public surface small and predictable. Implementation details
//! are split into submodules under `src/client/`.

pub mod builder;
pub mod config;
pub mod core;
mod execution;
mod operations;

pub use builder::KgClientBuilder;
pub use config::ClientConfig;
pub use core::KgClient;
