//! HTTP-facing error wrapper.

use axum::response::{IntoResponse, Response};
use vanguard_core::ProxyError;

/// A pipeline error as an HTTP response: the mapped status plus the textual
/// reason as a plain body.
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0.status_code(), self.0.to_string()).into_response()
    }
}
