//! Port traits for the external collaborators.
//!
//! Production adapters (`vanguard-adapters`) and test doubles both satisfy
//! these contracts; the orchestrator only ever sees the trait objects it was
//! constructed with.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::decision::ValidationDecision;
use crate::error::ProxyResult;
use crate::payload::RequestPayload;

/// A live, single-consumer backend response body.
///
/// Not seekable and not restartable; ownership moves from the upstream
/// adapter through the streaming relay to the client connection, and dropping
/// it closes the underlying connection exactly once.
pub type ResponseStream = BoxStream<'static, ProxyResult<Bytes>>;

/// The content-safety validator consulted before any forwarding.
#[async_trait]
pub trait Guardrail: Send + Sync {
    /// Submit the raw payload for a safety verdict.
    ///
    /// Implementations must be single-shot (no retries) and must honor
    /// `cancel` at every suspension point. Any inability to obtain a verdict
    /// maps to [`crate::ProxyError::ValidationUnavailable`].
    async fn validate(
        &self,
        payload: &RequestPayload,
        cancel: &CancellationToken,
    ) -> ProxyResult<ValidationDecision>;
}

/// The generative-text backend.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Forward the effective payload and return the live response stream.
    ///
    /// Implementations must not buffer the response body and must close the
    /// backend connection before returning an error.
    async fn generate(
        &self,
        payload: &RequestPayload,
        cancel: &CancellationToken,
    ) -> ProxyResult<ResponseStream>;
}
