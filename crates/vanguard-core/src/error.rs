//! Error taxonomy for the proxy pipeline.
//!
//! Every error is local to a single request. The variants mirror the stages
//! of the pipeline: waiting for / calling the validator, enforcing its
//! decision, calling the backend, and copying the response stream.

use http::StatusCode;
use thiserror::Error;

/// Convenience alias for pipeline results.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Errors produced by the request pipeline.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The caller's cancellation signal fired while waiting for a validator
    /// slot or during the validator call. No slot was consumed.
    #[error("request cancelled while awaiting safety validation")]
    ValidationCancelled,

    /// The validator could not produce a verdict: network error, non-success
    /// status, timeout, or malformed response. Fail-closed: the backend is
    /// never called.
    #[error("safety validation unavailable: {message}")]
    ValidationUnavailable {
        /// What went wrong, for logs and the response body.
        message: String,
    },

    /// The validator explicitly denied the request.
    #[error("blocked: {reason}")]
    PolicyViolation {
        /// The validator-supplied reason, surfaced to the caller.
        reason: String,
    },

    /// The backend call failed or returned a non-success status. The backend
    /// connection is already closed when this is returned.
    #[error("upstream error: {message}")]
    Upstream {
        /// HTTP status from the backend, if one was received.
        status: Option<u16>,
        /// What went wrong.
        message: String,
    },

    /// Failure while copying an already-started response stream. The bytes
    /// flushed so far remain the final (truncated) output.
    #[error("stream error: {message}")]
    Stream {
        /// What went wrong.
        message: String,
    },
}

impl ProxyError {
    /// Build a [`ProxyError::ValidationUnavailable`].
    pub fn validation_unavailable(message: impl Into<String>) -> Self {
        Self::ValidationUnavailable {
            message: message.into(),
        }
    }

    /// Build a [`ProxyError::PolicyViolation`].
    pub fn policy_violation(reason: impl Into<String>) -> Self {
        Self::PolicyViolation {
            reason: reason.into(),
        }
    }

    /// Build a [`ProxyError::Upstream`].
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Build a [`ProxyError::Stream`].
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// The HTTP status this error surfaces as.
    ///
    /// `Stream` maps to 502 for completeness, but in practice a stream error
    /// occurs after the status line has been sent and only truncates the body.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationCancelled => StatusCode::REQUEST_TIMEOUT,
            Self::ValidationUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::PolicyViolation { .. } => StatusCode::FORBIDDEN,
            Self::Upstream { .. } | Self::Stream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}
