//! Integration tests against a mock HTTP server and a scripted transport

pub mod batch;
pub mod executor;
pub mod mock_server;
pub mod operations;
