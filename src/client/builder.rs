use crate::client::config::ClientConfig;
use crate::client::core::KgClient;
use crate::resilience::{BackoffPolicy, RateLimitPolicy};
use crate::telemetry::StatsAccumulator;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable (developer-friendly).
pub struct KgClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl KgClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
        }
    }

    /// Start from an existing configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Apply `KG_*` environment overrides on top of the current settings.
    pub fn from_env(mut self) -> Self {
        self.config.apply_env(|key| std::env::var(key).ok());
        self
    }

    /// Replace the current settings with a YAML config file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = ClientConfig::from_file(path)?;
        Ok(self)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Total attempts allowed for transient failures (first attempt included).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn backoff(mut self, min: Duration, max: Duration) -> Self {
        self.config.min_backoff = min;
        self.config.max_backoff = max;
        self
    }

    /// Wait used for 429 responses without a usable `Retry-After`.
    pub fn rate_limit_default_wait(mut self, wait: Duration) -> Self {
        self.config.rate_limit_default_wait = wait;
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.config.pool_max_idle_per_host = n;
        self
    }

    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.config.protocol_version = version.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn proxy_url(mut self, proxy: impl Into<String>) -> Self {
        self.config.proxy_url = Some(proxy.into());
        self
    }

    /// Inject a transport instead of the default reqwest one.
    ///
    /// Primarily for testing; the HTTP-level settings in the config are
    /// then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<KgClient> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };

        Ok(KgClient {
            backoff: BackoffPolicy::new(self.config.min_backoff, self.config.max_backoff),
            rate_limit: RateLimitPolicy::new(self.config.rate_limit_default_wait),
            stats: Arc::new(StatsAccumulator::new()),
            transport,
            config: self.config,
        })
    }
}

impl Default for KgClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
