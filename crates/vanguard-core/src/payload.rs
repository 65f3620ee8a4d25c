//! The request payload and the forwarded-header allow-list.

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::HeaderMap;

/// The fixed set of caller headers that may cross the proxy.
///
/// Anything not named here is dropped silently at the boundary, never
/// forwarded. The `Authorization` value is carried for completeness but the
/// upstream adapter always overwrites it with the configured credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardHeaders {
    content_type: Option<String>,
    authorization: Option<String>,
}

impl ForwardHeaders {
    /// An empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `Content-Type` value.
    #[must_use]
    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    /// Set the `Authorization` value.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Extract the allow-listed headers from an inbound header map.
    ///
    /// Header values that are not valid UTF-8 are treated as absent.
    #[must_use]
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let get = |name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        Self {
            content_type: get(&CONTENT_TYPE),
            authorization: get(&AUTHORIZATION),
        }
    }

    /// The forwarded `Content-Type`, if the caller sent one.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The caller's `Authorization` value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

/// An immutable request entering the pipeline: the caller's raw JSON body
/// plus the allow-listed headers.
///
/// Sanitization never mutates a payload; it produces a new one via
/// [`RequestPayload::with_body`].
#[derive(Debug, Clone)]
pub struct RequestPayload {
    body: Bytes,
    headers: ForwardHeaders,
}

impl RequestPayload {
    /// Create a payload from body bytes and forwarded headers.
    pub fn new(body: impl Into<Bytes>, headers: ForwardHeaders) -> Self {
        Self {
            body: body.into(),
            headers,
        }
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The forwarded headers.
    #[must_use]
    pub fn headers(&self) -> &ForwardHeaders {
        &self.headers
    }

    /// A new payload with the body fully replaced and the headers kept.
    #[must_use]
    pub fn with_body(&self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            headers: self.headers.clone(),
        }
    }
}
