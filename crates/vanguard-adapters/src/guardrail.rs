//! The validator gateway.
//!
//! One instance owns the process-wide concurrency limiter; every in-flight
//! request contends on it before its safety check may start. The outbound
//! call runs under a short per-call timeout, independent of (and normally
//! much tighter than) the caller's own deadline, so a slow validator fails
//! the request early instead of holding it hostage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use vanguard_core::{Guardrail, ProxyError, ProxyResult, RequestPayload, ValidationDecision};

/// Validator gateway configuration.
#[derive(Debug, Clone)]
pub struct GuardrailConfig {
    /// Validator endpoint URL.
    pub url: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Capacity of the shared concurrency limiter.
    pub max_concurrency: usize,
}

impl GuardrailConfig {
    /// Create a configuration with the given endpoint and library defaults
    /// for the rest.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(1),
            max_concurrency: 50,
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the limiter capacity.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// HTTP implementation of the [`Guardrail`] port.
pub struct HttpGuardrail {
    client: Client,
    url: String,
    limiter: Arc<Semaphore>,
}

impl HttpGuardrail {
    /// Build the gateway. The per-call timeout is enforced by the underlying
    /// HTTP client, covering connect, request, and response decode.
    ///
    /// # Errors
    ///
    /// Returns the client builder's error if the TLS backend cannot be
    /// initialized.
    pub fn new(config: GuardrailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url,
            limiter: Arc::new(Semaphore::new(config.max_concurrency)),
        })
    }

    /// Permits currently available on the limiter.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }
}

#[async_trait]
impl Guardrail for HttpGuardrail {
    async fn validate(
        &self,
        payload: &RequestPayload,
        cancel: &CancellationToken,
    ) -> ProxyResult<ValidationDecision> {
        // Cancellation while queued must not consume a slot.
        let _permit = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled while waiting for a validator slot");
                return Err(ProxyError::ValidationCancelled);
            }
            permit = Arc::clone(&self.limiter).acquire_owned() => {
                permit.map_err(|_| ProxyError::validation_unavailable("validator limiter closed"))?
            }
        };

        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.body().clone());

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled during the validator call");
                return Err(ProxyError::ValidationCancelled);
            }
            result = request.send() => result.map_err(|e| {
                warn!(error = %e, "validator request failed");
                ProxyError::validation_unavailable(format!("validator request failed: {e}"))
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "validator returned non-success status");
            return Err(ProxyError::validation_unavailable(format!(
                "validator returned status {status}"
            )));
        }

        // The timeout also bounds the body read, so a validator that accepts
        // the request and then stalls still fails within the deadline.
        let decision = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled while reading the validator response");
                return Err(ProxyError::ValidationCancelled);
            }
            result = response.json::<ValidationDecision>() => result.map_err(|e| {
                warn!(error = %e, "validator response did not decode");
                ProxyError::validation_unavailable(format!("invalid validator response: {e}"))
            })?,
        };

        debug!(allowed = decision.allowed, "validator verdict received");
        Ok(decision)
    }
}
