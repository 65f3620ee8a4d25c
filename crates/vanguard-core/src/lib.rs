//! # Vanguard Core
//!
//! Domain types, port traits, and the request orchestrator for the Vanguard
//! safety-gated proxy.
//!
//! The crate is deliberately transport-free: it defines the contracts a
//! validator ([`Guardrail`]) and a generative backend ([`Upstream`]) must
//! satisfy, and the [`ProxyService`] that sequences them under fail-closed
//! semantics. HTTP adapters live in `vanguard-adapters`; the HTTP surface
//! lives in `vanguard-server`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod error;
pub mod payload;
pub mod ports;
pub mod service;

// Re-export commonly used types
pub use decision::ValidationDecision;
pub use error::{ProxyError, ProxyResult};
pub use payload::{ForwardHeaders, RequestPayload};
pub use ports::{Guardrail, ResponseStream, Upstream};
pub use service::ProxyService;
