//! Route definitions.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Create the proxy router: the completion endpoint plus the liveness probe.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat/completions", post(handlers::completion))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
