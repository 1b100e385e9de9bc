use super::{RawResponse, Transport, TransportError};
use crate::client::ClientConfig;
use crate::protocol::RequestSpec;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Proxy;
use tracing::debug;

/// Header carrying the MCP protocol version the client speaks.
pub const PROTOCOL_VERSION_HEADER: &str = "x-mcp-version";
/// Correlation id, identical for every attempt of one logical call.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// reqwest-backed transport owning the shared connection pool.
///
/// The pool lives as long as the transport; dropping the last handle closes
/// idle connections.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let headers = Self::default_headers(config)?;

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid proxy URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("config.proxy_url")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
        let invalid = |field: &str, e: reqwest::header::InvalidHeaderValue| {
            Error::configuration_with_context(
                format!("Invalid header value: {}", e),
                ErrorContext::new()
                    .with_field_path(format!("config.{}", field))
                    .with_source("http_transport"),
            )
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            PROTOCOL_VERSION_HEADER,
            HeaderValue::from_str(&config.protocol_version)
                .map_err(|e| invalid("protocol_version", e))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| invalid("user_agent", e))?,
        );
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| invalid("api_key", e))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &RequestSpec,
        request_id: &str,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(request_id, method = request.method.as_str(), url = url.as_str(), "sending request");

        let mut req = self
            .client
            .request(request.method.into(), &url)
            .header(REQUEST_ID_HEADER, request_id);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(payload) = &request.payload {
            req = req.json(payload);
        }
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await.map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify_reqwest_error)?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Http(e)
    }
}
