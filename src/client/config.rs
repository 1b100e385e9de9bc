//! Client configuration: defaults, environment overrides, YAML files.

use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Every knob of a [`crate::KgClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Total attempts for transient failures, including the first one.
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    /// Wait applied to a 429 without a usable `Retry-After`.
    pub rate_limit_default_wait: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub protocol_version: String,
    pub user_agent: String,
    pub proxy_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            rate_limit_default_wait: Duration::from_secs(60),
            pool_max_idle_per_host: 20,
            pool_idle_timeout: Duration::from_secs(30),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            user_agent: format!("kg-client-rust/{}", env!("CARGO_PKG_VERSION")),
            proxy_url: None,
        }
    }
}

/// On-disk form. Every key is optional; absent keys keep the current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    max_attempts: Option<u32>,
    min_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
    rate_limit_default_wait_secs: Option<u64>,
    pool_max_idle_per_host: Option<usize>,
    pool_idle_timeout_secs: Option<u64>,
    protocol_version: Option<String>,
    user_agent: Option<String>,
    proxy_url: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `KG_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values found through `lookup`.
    ///
    /// Recognised keys: `KG_BASE_URL`, `KG_API_KEY`, `KG_HTTP_TIMEOUT_SECS`,
    /// `KG_MAX_ATTEMPTS`, `KG_HTTP_POOL_MAX_IDLE_PER_HOST`, `KG_PROXY_URL`.
    /// Unparsable numbers are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("KG_BASE_URL") {
            self.base_url = url;
        }
        if let Some(key) = non_empty("KG_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(secs) = parse_env::<u64>("KG_HTTP_TIMEOUT_SECS", non_empty("KG_HTTP_TIMEOUT_SECS")) {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_env::<u32>("KG_MAX_ATTEMPTS", non_empty("KG_MAX_ATTEMPTS")) {
            self.max_attempts = n;
        }
        if let Some(n) = parse_env::<usize>(
            "KG_HTTP_POOL_MAX_IDLE_PER_HOST",
            non_empty("KG_HTTP_POOL_MAX_IDLE_PER_HOST"),
        ) {
            self.pool_max_idle_per_host = n;
        }
        if let Some(proxy) = non_empty("KG_PROXY_URL") {
            self.proxy_url = Some(proxy);
        }
    }

    /// Defaults overlaid with a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid config file: {}", e),
                ErrorContext::new().with_source("config_file"),
            )
        })?;
        let mut config = Self::default();
        config.apply_file(file);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(path.display().to_string()),
            },
            other => other,
        })
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if file.api_key.is_some() {
            self.api_key = file.api_key;
        }
        if let Some(v) = file.timeout_secs {
            self.timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.max_attempts {
            self.max_attempts = v;
        }
        if let Some(v) = file.min_backoff_ms {
            self.min_backoff = Duration::from_millis(v);
        }
        if let Some(v) = file.max_backoff_ms {
            self.max_backoff = Duration::from_millis(v);
        }
        if let Some(v) = file.rate_limit_default_wait_secs {
            self.rate_limit_default_wait = Duration::from_secs(v);
        }
        if let Some(v) = file.pool_max_idle_per_host {
            self.pool_max_idle_per_host = v;
        }
        if let Some(v) = file.pool_idle_timeout_secs {
            self.pool_idle_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.protocol_version {
            self.protocol_version = v;
        }
        if let Some(v) = file.user_agent {
            self.user_agent = v;
        }
        if file.proxy_url.is_some() {
            self.proxy_url = file.proxy_url;
        }
    }

    /// Reject settings the executor cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, msg: String, details: String| {
            Err(Error::configuration_with_context(
                msg,
                ErrorContext::new()
                    .with_field_path(format!("config.{}", field))
                    .with_details(details)
                    .with_source("client_config"),
            ))
        };

        if self.max_attempts == 0 {
            return invalid(
                "max_attempts",
                "max_attempts must be at least 1".to_string(),
                "got 0".to_string(),
            );
        }
        if self.min_backoff > self.max_backoff {
            return invalid(
                "min_backoff",
                "min_backoff must not exceed max_backoff".to_string(),
                format!("{:?} > {:?}", self.min_backoff, self.max_backoff),
            );
        }
        if self.timeout.is_zero() {
            return invalid(
                "timeout",
                "timeout must be greater than zero".to_string(),
                "got 0s".to_string(),
            );
        }
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            Ok(url) => invalid(
                "base_url",
                format!("unsupported URL scheme: {}", url.scheme()),
                self.base_url.clone(),
            ),
            Err(e) => invalid(
                "base_url",
                format!("invalid base URL: {}", e),
                self.base_url.clone(),
            ),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw.as_str(), "ignoring unparsable environment override");
            None
        }
    }
}
