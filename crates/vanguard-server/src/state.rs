//! Shared application state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vanguard_core::ProxyService;

/// State handed to every handler.
///
/// Cloning is cheap; the service and shutdown token are shared.
#[derive(Clone)]
pub struct AppState {
    /// The request orchestrator.
    pub service: Arc<ProxyService>,
    /// Process-level shutdown signal. Each request derives a child token
    /// from it, so shutdown cancels queued validator waits immediately while
    /// responses that are already streaming drain on their own.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create the state for a service.
    pub fn new(service: ProxyService) -> Self {
        Self {
            service: Arc::new(service),
            shutdown: CancellationToken::new(),
        }
    }
}
