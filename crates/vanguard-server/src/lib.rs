//! # Vanguard Server
//!
//! The proxy's HTTP surface: an axum router exposing the completion endpoint
//! and a liveness check, the chunk-by-chunk streaming relay that copies the
//! backend's live body to the caller, and signal-driven graceful shutdown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod relay;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use routes::create_router;
pub use server::{Server, ServerConfig};
pub use state::AppState;
