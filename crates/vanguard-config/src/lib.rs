//! # Vanguard Config
//!
//! Process configuration for the proxy, loaded from environment variables.
//!
//! Every knob has a default except the upstream credential; a missing
//! `LLM_API_KEY` is a startup error rather than a runtime surprise.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use tracing::warn;

/// Environment variable names, kept in one place.
mod vars {
    pub const SERVER_PORT: &str = "SERVER_PORT";
    pub const GUARDRAIL_URL: &str = "GUARDRAIL_URL";
    pub const GUARDRAIL_MAX_CONCURRENCY: &str = "GUARDRAIL_MAX_CONCURRENCY";
    pub const GUARDRAIL_TIMEOUT: &str = "GUARDRAIL_TIMEOUT";
    pub const LLM_URL: &str = "LLM_URL";
    pub const LLM_API_KEY: &str = "LLM_API_KEY";
}

/// Default validator endpoint (local sidecar).
pub const DEFAULT_GUARDRAIL_URL: &str = "http://localhost:8000/validate";
/// Default backend endpoint.
pub const DEFAULT_LLM_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";
/// Default validator concurrency limit.
pub const DEFAULT_GUARDRAIL_MAX_CONCURRENCY: usize = 50;
/// Default validator timeout in seconds.
pub const DEFAULT_GUARDRAIL_TIMEOUT_SECS: u64 = 1;
/// Default listen port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable was not set.
    #[error("required environment variable {var} is not set")]
    MissingVariable {
        /// The variable name.
        var: &'static str,
    },
    /// A variable was set to a value that does not parse or is out of range.
    #[error("invalid value for {var}: {message}")]
    InvalidValue {
        /// The variable name.
        var: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Resolved process configuration.
pub struct ProxyConfig {
    /// Listen port for the HTTP server.
    pub port: u16,
    /// Validator endpoint URL.
    pub guardrail_url: String,
    /// Capacity of the shared validator concurrency limiter.
    pub guardrail_max_concurrency: usize,
    /// Per-call validator timeout. Deliberately short; independent of the
    /// upstream timeout.
    pub guardrail_timeout: Duration,
    /// Backend endpoint URL.
    pub llm_url: String,
    /// Upstream credential, injected into every backend call.
    pub llm_api_key: SecretString,
}

// Manual Debug so the credential can never leak through a log line.
impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("port", &self.port)
            .field("guardrail_url", &self.guardrail_url)
            .field("guardrail_max_concurrency", &self.guardrail_max_concurrency)
            .field("guardrail_timeout", &self.guardrail_timeout)
            .field("llm_url", &self.llm_url)
            .field("llm_api_key", &"[REDACTED]")
            .finish()
    }
}

impl ProxyConfig {
    /// Load the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LLM_API_KEY` is unset or a numeric
    /// variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse_or(vars::SERVER_PORT, DEFAULT_SERVER_PORT)?;
        let guardrail_url = env_or(vars::GUARDRAIL_URL, DEFAULT_GUARDRAIL_URL);
        let guardrail_max_concurrency = env_parse_or(
            vars::GUARDRAIL_MAX_CONCURRENCY,
            DEFAULT_GUARDRAIL_MAX_CONCURRENCY,
        )?;
        if guardrail_max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                var: vars::GUARDRAIL_MAX_CONCURRENCY,
                message: "concurrency limit must be at least 1".to_string(),
            });
        }
        let timeout_secs: u64 =
            env_parse_or(vars::GUARDRAIL_TIMEOUT, DEFAULT_GUARDRAIL_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: vars::GUARDRAIL_TIMEOUT,
                message: "timeout must be at least 1 second".to_string(),
            });
        }
        let llm_url = env_or(vars::LLM_URL, DEFAULT_LLM_URL);
        let llm_api_key = env::var(vars::LLM_API_KEY)
            .ok()
            .filter(|v| !v.is_empty())
            .map(SecretString::new)
            .ok_or(ConfigError::MissingVariable {
                var: vars::LLM_API_KEY,
            })?;

        Ok(Self {
            port,
            guardrail_url,
            guardrail_max_concurrency,
            guardrail_timeout: Duration::from_secs(timeout_secs),
            llm_url,
            llm_api_key,
        })
    }
}

fn env_or(var: &'static str, default: &str) -> String {
    env::var(var).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| {
        warn!(%var, %default, "environment variable not set, using default");
        default.to_string()
    })
}

fn env_parse_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(raw) if !raw.is_empty() => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            message: e.to_string(),
        }),
        _ => Ok(default),
    }
}
