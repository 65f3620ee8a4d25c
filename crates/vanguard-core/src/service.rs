//! The request orchestrator.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ProxyError, ProxyResult};
use crate::payload::RequestPayload;
use crate::ports::{Guardrail, ResponseStream, Upstream};

/// Sequences validation and forwarding for one request under fail-closed
/// semantics.
///
/// Exactly one validator call and at most one upstream call are made per
/// request; there are no retries at this layer. The collaborators are
/// injected at construction, so production adapters and test doubles are
/// interchangeable.
pub struct ProxyService {
    guardrail: Arc<dyn Guardrail>,
    upstream: Arc<dyn Upstream>,
}

impl ProxyService {
    /// Create a service over the given validator and backend.
    pub fn new(guardrail: Arc<dyn Guardrail>, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            guardrail,
            upstream,
        }
    }

    /// Run the pipeline: validate, enforce, optionally swap the payload,
    /// forward.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::ValidationCancelled`] if `cancel` fired during
    ///   validation;
    /// - [`ProxyError::ValidationUnavailable`] if no verdict could be
    ///   obtained (fail-closed: the backend is never invoked);
    /// - [`ProxyError::PolicyViolation`] if the validator denied the request;
    /// - [`ProxyError::Upstream`] if the backend call failed.
    pub async fn execute(
        &self,
        payload: RequestPayload,
        cancel: &CancellationToken,
    ) -> ProxyResult<ResponseStream> {
        let decision = match self.guardrail.validate(&payload, cancel).await {
            Ok(decision) => decision,
            Err(err @ ProxyError::ValidationCancelled) => return Err(err),
            Err(err) => {
                // Fail closed: any inability to obtain a verdict is treated
                // as "unsafe", whatever shape the adapter error took.
                warn!(error = %err, "guardrail check failed, rejecting request");
                return Err(match err {
                    err @ ProxyError::ValidationUnavailable { .. } => err,
                    other => ProxyError::validation_unavailable(other.to_string()),
                });
            }
        };

        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "policy violation".to_string());
            info!(%reason, "request blocked by guardrail");
            return Err(ProxyError::PolicyViolation { reason });
        }

        let effective = match decision.replacement() {
            Some(body) => {
                debug!(
                    original_len = payload.body().len(),
                    sanitized_len = body.len(),
                    "guardrail supplied a sanitized payload"
                );
                payload.with_body(body)
            }
            None => payload,
        };

        self.upstream.generate(&effective, cancel).await
    }
}
