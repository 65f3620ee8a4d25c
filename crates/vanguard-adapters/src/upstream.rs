//! The upstream relay.
//!
//! Forwards the effective payload to the generative backend and hands the
//! response body back as a live stream. The caller's `Authorization` value
//! never reaches the backend: the configured credential is always injected
//! in its place.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use vanguard_core::{ProxyError, ProxyResult, RequestPayload, ResponseStream, Upstream};

/// Upstream relay configuration.
pub struct UpstreamConfig {
    /// Backend endpoint URL.
    pub url: String,
    /// Credential injected into every backend call.
    pub api_key: SecretString,
    /// Total request timeout, generation-sized. Bounds the full response
    /// body, streamed or not.
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Create a configuration with a 60 second generation timeout.
    pub fn new(url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            url: url.into(),
            api_key,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP implementation of the [`Upstream`] port.
pub struct HttpUpstream {
    client: Client,
    url: String,
    api_key: SecretString,
}

impl HttpUpstream {
    /// Build the relay.
    ///
    /// # Errors
    ///
    /// Returns the client builder's error if the TLS backend cannot be
    /// initialized.
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url,
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn generate(
        &self,
        payload: &RequestPayload,
        cancel: &CancellationToken,
    ) -> ProxyResult<ResponseStream> {
        let content_type = payload
            .headers()
            .content_type()
            .unwrap_or("application/json");

        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            // The real credential, never the caller's.
            .bearer_auth(self.api_key.expose_secret())
            .body(payload.body().clone());

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled before the upstream call completed");
                return Err(ProxyError::upstream(None, "request cancelled"));
            }
            result = request.send() => result.map_err(|e| {
                warn!(error = %e, "upstream request failed");
                ProxyError::upstream(None, format!("upstream request failed: {e}"))
            })?,
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            // Dropping the response closes the connection; nothing leaks.
            drop(response);
            warn!(status = %status, "upstream returned error status");
            return Err(ProxyError::upstream(
                Some(status.as_u16()),
                format!("upstream returned status {status}"),
            ));
        }

        debug!(status = %status, "upstream stream opened");
        let stream = response
            .bytes_stream()
            .map_err(|e| ProxyError::stream(format!("upstream read failed: {e}")));
        Ok(stream.boxed())
    }
}
