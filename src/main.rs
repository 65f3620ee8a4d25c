//! # Vanguard
//!
//! Safety-gated reverse proxy for a generative-text backend.
//!
//! Every completion request is validated by a guardrail sidecar before it is
//! forwarded; the backend response is streamed back to the caller unbuffered.
//!
//! ## Usage
//!
//! ```bash
//! LLM_API_KEY=sk-... vanguard
//!
//! # Override the listen port and the validator endpoint
//! SERVER_PORT=9000 GUARDRAIL_URL=http://validator:8000/validate \
//!     LLM_API_KEY=sk-... vanguard
//! ```

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vanguard_adapters::{GuardrailConfig, HttpGuardrail, HttpUpstream, UpstreamConfig};
use vanguard_config::ProxyConfig;
use vanguard_core::ProxyService;
use vanguard_server::{AppState, Server, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "starting vanguard");

    if let Err(e) = run().await {
        error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProxyConfig::from_env()?;

    info!(
        port = config.port,
        guardrail_url = %config.guardrail_url,
        guardrail_max_concurrency = config.guardrail_max_concurrency,
        guardrail_timeout_secs = config.guardrail_timeout.as_secs(),
        llm_url = %config.llm_url,
        "configuration loaded"
    );

    let guardrail = HttpGuardrail::new(
        GuardrailConfig::new(config.guardrail_url)
            .with_timeout(config.guardrail_timeout)
            .with_max_concurrency(config.guardrail_max_concurrency),
    )?;
    let upstream = HttpUpstream::new(UpstreamConfig::new(config.llm_url, config.llm_api_key))?;

    let service = ProxyService::new(Arc::new(guardrail), Arc::new(upstream));
    let state = AppState::new(service);

    let server = Server::new(ServerConfig::new().with_port(config.port), state);
    server.run().await?;

    Ok(())
}
