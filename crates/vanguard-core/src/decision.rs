//! The validator's verdict.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A successfully decoded validator response.
///
/// Wire shape: `{ "allowed": bool, "reason"?: string, "sanitized_input"?: any }`.
///
/// "No replacement" is decided at the decoded level: an absent field or an
/// explicit JSON `null` both mean the original payload is forwarded
/// unchanged. Any other JSON value (including `""`, `{}`, `[]`) is a full
/// replacement; partial merges do not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDecision {
    /// Whether the request may be forwarded at all.
    pub allowed: bool,
    /// Human-readable denial reason, surfaced to the caller when
    /// `allowed` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Optional replacement payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitized_input: Option<Value>,
}

impl ValidationDecision {
    /// An unconditional "allowed, unchanged" decision.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            sanitized_input: None,
        }
    }

    /// A denial with the given reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            sanitized_input: None,
        }
    }

    /// An "allowed" decision whose payload must be replaced.
    #[must_use]
    pub fn sanitized(replacement: Value) -> Self {
        Self {
            allowed: true,
            reason: None,
            sanitized_input: Some(replacement),
        }
    }

    /// The replacement body, serialized, if the decision carries one.
    ///
    /// Returns `None` when `sanitized_input` is absent or JSON `null`, in
    /// which case the original payload is used. Only meaningful when
    /// `allowed` is true.
    #[must_use]
    pub fn replacement(&self) -> Option<Bytes> {
        match &self.sanitized_input {
            None | Some(Value::Null) => None,
            Some(value) => Some(Bytes::from(value.to_string())),
        }
    }
}
