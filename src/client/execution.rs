//! Request execution: the retry/rate-limit loop around a single logical call.

use crate::protocol::{RequestSpec, ResponseEnvelope};
use crate::resilience::RateLimitPolicy;
use crate::transport::{RawResponse, TransportError};
use crate::{Error, Result};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::core::KgClient;

impl KgClient {
    /// Send `request` and return the envelope payload.
    ///
    /// - Network errors and timeouts are retried with exponential backoff
    ///   until `max_attempts` attempts have been made.
    /// - `429` waits for `Retry-After` and resubmits, without limit and
    ///   without consuming an attempt.
    /// - Any other status >= 400, or a `success: false` envelope, fails
    ///   immediately.
    ///
    /// Every attempt carries the same `x-request-id`.
    pub async fn execute(&self, request: RequestSpec) -> Result<Value> {
        let request_id = Uuid::new_v4().to_string();
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let max_attempts = self.config.max_attempts.max(1);

        let mut call = self.stats.begin_call();
        let mut failures: u32 = 0;

        debug!(
            request_id = request_id.as_str(),
            method = request.method.as_str(),
            path = request.path.as_str(),
            "request started"
        );

        loop {
            let attempt = tokio::time::timeout(timeout, self.transport.send(&request, &request_id)).await;
            call.checkpoint();

            let outcome = match attempt {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Timeout(timeout)),
            };

            let response = match outcome {
                Ok(response) => response,
                Err(e) if e.is_transient() => {
                    failures += 1;
                    if failures >= max_attempts {
                        warn!(
                            request_id = request_id.as_str(),
                            path = request.path.as_str(),
                            attempt = failures,
                            error = %e,
                            "request failed, retries exhausted"
                        );
                        call.fail();
                        return Err(Error::TransientFailure {
                            attempts: failures,
                            source: e,
                        });
                    }
                    let delay = self.backoff.delay(failures);
                    warn!(
                        request_id = request_id.as_str(),
                        path = request.path.as_str(),
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    call.checkpoint();
                    continue;
                }
                Err(e) => {
                    warn!(
                        request_id = request_id.as_str(),
                        path = request.path.as_str(),
                        error = %e,
                        "request failed"
                    );
                    call.fail();
                    return Err(Error::Transport(e));
                }
            };

            if RateLimitPolicy::is_rate_limited(&response) {
                let wait = self.rate_limit.wait_for(&response);
                warn!(
                    request_id = request_id.as_str(),
                    path = request.path.as_str(),
                    retry_after_secs = wait.as_secs(),
                    "rate limited, waiting"
                );
                tokio::time::sleep(wait).await;
                call.record_retry();
                call.checkpoint();
                continue;
            }

            let status = response.status;
            return match interpret_response(response) {
                Ok(data) => {
                    call.succeed();
                    info!(
                        request_id = request_id.as_str(),
                        method = request.method.as_str(),
                        path = request.path.as_str(),
                        http_status = status,
                        "request completed"
                    );
                    Ok(data)
                }
                Err(e) => {
                    call.fail();
                    warn!(
                        request_id = request_id.as_str(),
                        path = request.path.as_str(),
                        http_status = status,
                        error = %e,
                        "request failed"
                    );
                    Err(e)
                }
            };
        }
    }
}

/// Turn a non-429 response into the payload or the matching error.
pub(crate) fn interpret_response(response: RawResponse) -> Result<Value> {
    let status = response.status;

    if status >= 400 {
        let envelope = ResponseEnvelope::parse(status, &response.body).ok();
        let message = envelope
            .as_ref()
            .and_then(|e| e.error_message())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        let code = envelope
            .as_ref()
            .and_then(|e| e.error_code())
            .map(str::to_string);
        return Err(Error::Http {
            status,
            message,
            code,
        });
    }

    let envelope = ResponseEnvelope::parse(status, &response.body).map_err(|e| {
        Error::InvalidResponse {
            status,
            message: format!("body is not valid JSON: {}", e),
        }
    })?;

    if !envelope.success {
        return Err(Error::Api {
            message: envelope
                .error_message()
                .unwrap_or(ResponseEnvelope::UNKNOWN_API_ERROR)
                .to_string(),
            code: envelope.error_code().map(str::to_string),
        });
    }

    Ok(envelope.into_data())
}
