//! # Vanguard Adapters
//!
//! Production implementations of the `vanguard-core` ports:
//!
//! - [`HttpGuardrail`]: the validator gateway, calling the safety sidecar
//!   under a shared concurrency limiter and a short timeout;
//! - [`HttpUpstream`]: the backend relay, injecting the real credential and
//!   returning the response body as a live stream.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod guardrail;
pub mod upstream;

pub use guardrail::{GuardrailConfig, HttpGuardrail};
pub use upstream::{HttpUpstream, UpstreamConfig};
