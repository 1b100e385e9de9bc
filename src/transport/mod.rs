//! Transport seam between the request executor and the network.
//!
//! The executor only needs "send this request, give me status + headers +
//! body". Keeping that behind [`Transport`] lets tests script exact failure
//! sequences without a live server.

mod http;

pub use http::HttpTransport;

use crate::protocol::RequestSpec;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// A completed HTTP exchange, before envelope interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(v) = reqwest::header::HeaderValue::from_str(value) {
            self.headers.insert(name, v);
        }
        self
    }

    /// Extract the first non-empty value among the given header names.
    pub fn header_first(&self, names: &[&str]) -> Option<String> {
        for name in names {
            if let Some(v) = self.headers.get(*name) {
                if let Ok(s) = v.to_str() {
                    let s = s.trim();
                    if !s.is_empty() {
                        return Some(s.to_string());
                    }
                }
            }
        }
        None
    }
}

/// Sends one attempt of a request. Implementations must be shareable across
/// concurrently running calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `request_id` is stable across all attempts of one logical call.
    async fn send(
        &self,
        request: &RequestSpec,
        request_id: &str,
    ) -> std::result::Result<RawResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether another attempt may succeed. Malformed requests never will.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout(_) | TransportError::Connect(_) => true,
            TransportError::Http(e) => !e.is_builder(),
            TransportError::Other(_) => false,
        }
    }
}
