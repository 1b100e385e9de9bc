//! Mock HTTP server setup for integration tests

use kg_client::KgClient;
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::time::Duration;

pub const API_KEY: &str = "test-key";

/// Test fixture that manages a mock server mounted under `/api`
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = format!("{}/api", server.url());
        Self { server, base_url }
    }

    /// Client against the mock server with short backoff so transient
    /// retries do not slow the suite down.
    pub fn client(&self) -> KgClient {
        KgClient::builder()
            .base_url(&self.base_url)
            .api_key(API_KEY)
            .timeout(Duration::from_secs(5))
            .backoff(Duration::from_millis(10), Duration::from_millis(20))
            .build()
            .expect("valid test client")
    }

    /// Envelope-wrapped success for `method path`.
    pub async fn mock_success(&mut self, method: &str, path: &str, data: serde_json::Value) -> Mock {
        let body = serde_json::json!({ "success": true, "data": data }).to_string();
        self.server
            .mock(method, format!("/api{}", path).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Raw response for `method path` whose body matches `body`.
    pub async fn mock_with_body(
        &mut self,
        method: &str,
        path: &str,
        body: Matcher,
        status: usize,
        response: &str,
    ) -> Mock {
        self.server
            .mock(method, format!("/api{}", path).as_str())
            .match_body(body)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(response)
            .create_async()
            .await
    }
}
