//! Server configuration.
//!
//! Resolution order: built-in defaults, then `XINGCHENG_*` environment
//! variables, then command-line flags (applied by `main`).

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API binds to.
    pub bind_addr: String,
    /// Bearer token required on every route except `/health`.
    pub api_key: Option<String>,
    /// Requests per second across all clients; 0 disables the limiter.
    pub rate_limit_per_sec: u32,
    /// Artificial "divining" delay before the oracle answers.
    pub oracle_delay_ms: u64,
    /// Period of the excavation countdown timer.
    pub tick_interval_ms: u64,
    /// Mount the `/debug/*` routes.
    pub enable_debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            api_key: None,
            rate_limit_per_sec: 50,
            oracle_delay_ms: 1_500,
            tick_interval_ms: 1_000,
            enable_debug: false,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by any key source. Unparseable values are
    /// ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("XINGCHENG_BIND") {
            config.bind_addr = addr;
        }
        if let Some(key) = lookup("XINGCHENG_API_KEY").filter(|k| !k.is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(v) = parse_var(&lookup, "XINGCHENG_RATE_LIMIT") {
            config.rate_limit_per_sec = v;
        }
        if let Some(v) = parse_var(&lookup, "XINGCHENG_ORACLE_DELAY_MS") {
            config.oracle_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "XINGCHENG_TICK_MS") {
            config.tick_interval_ms = v;
        }
        if let Some(v) = lookup("XINGCHENG_DEBUG") {
            config.enable_debug = matches!(v.as_str(), "1" | "true" | "yes");
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}
