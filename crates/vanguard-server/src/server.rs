//! Server lifecycle: bind, serve, drain, stop.

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::routes::create_router;
use crate::shutdown::wait_for_signal;
use crate::state::AppState;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// How long already-streaming responses may take to finish after a
    /// shutdown signal before their connections are closed.
    pub drain_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            drain_grace: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the listen port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the drain grace period.
    #[must_use]
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
}

/// The proxy HTTP server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server over the given state.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until a shutdown signal arrives, then drain.
    ///
    /// On SIGINT/SIGTERM the process-level token is cancelled first, which
    /// immediately unblocks requests still queued on the validator limiter;
    /// connections that are already streaming get `drain_grace` to finish
    /// before being closed forcibly.
    ///
    /// # Errors
    ///
    /// Returns the bind or serve error.
    pub async fn run(self) -> io::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "listening");

        let shutdown = self.state.shutdown.clone();
        let drain_grace = self.config.drain_grace;
        let app = create_router(self.state);

        let serve = axum::serve(listener, app).with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        });
        let mut serving = tokio::spawn(serve.into_future());

        tokio::select! {
            result = &mut serving => return flatten(result),
            () = wait_for_signal() => {
                info!(grace_secs = drain_grace.as_secs(), "shutting down, draining connections");
                shutdown.cancel();
            }
        }

        match tokio::time::timeout(drain_grace, &mut serving).await {
            Ok(result) => {
                info!("server exited cleanly");
                flatten(result)
            }
            Err(_) => {
                warn!("drain grace period elapsed, closing remaining connections");
                serving.abort();
                Ok(())
            }
        }
    }
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    match result {
        Ok(inner) => inner,
        Err(join_error) => Err(io::Error::new(io::ErrorKind::Other, join_error)),
    }
}
