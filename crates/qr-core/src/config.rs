//! Gateway configuration
//!
//! Configuration is read from the process environment exactly once, in
//! `GatewayConfig::from_env()` at startup, and handed by reference to
//! whoever needs it. A missing bearer token is deliberately not a startup
//! failure: the gateway still serves its catalog and health endpoints, and
//! each upstream call that needs the credential fails on its own.

use tracing::warn;

/// Default listening port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Base URL of the Qricambi REST API.
pub const DEFAULT_API_BASE: &str = "https://api.qricambi.com";

/// Process-wide gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bearer token for the upstream API (`QRICAMBI_BEARER`).
    pub bearer: Option<String>,
    /// Listening port (`PORT`, default 8080).
    pub port: u16,
    /// Upstream API base URL (`QRICAMBI_API_URL`).
    pub api_base: String,
}

impl GatewayConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let bearer = get_config_opt("QRICAMBI_BEARER");
        if bearer.is_none() {
            warn!("QRICAMBI_BEARER is not set; upstream calls will fail until it is");
        }

        Self {
            bearer,
            port: get_config_port("PORT", DEFAULT_PORT),
            api_base: get_config("QRICAMBI_API_URL", DEFAULT_API_BASE),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bearer: None,
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Get a configuration value with a default.
pub fn get_config(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional configuration value (empty counts as unset).
pub fn get_config_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get a TCP port configuration value.
///
/// Anything that does not parse as a `u16` (garbage or out of range, like
/// `70000`) falls back to the default with a warning instead of silently
/// truncating.
pub fn get_config_port(key: &str, default: u16) -> u16 {
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!("{key}={raw} is not a valid port, using {default}");
                default
            }
        },
        Err(_) => default,
    }
}
