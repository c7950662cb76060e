//! Application configuration
//!
//! Every setting is read from the process environment once at start-up and
//! handed to the components that need it. Missing or malformed values fall
//! back to their defaults; loading never fails.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::canary::Canary;
use crate::logging::LogFormat;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_REDIS_HOST: &str = "localhost";
const DEFAULT_REDIS_PORT: u16 = 6379;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Set-store connection configuration
    pub store: StoreConfig,
    /// Artificial latency and fault injection
    pub delays: DelayConfig,
    /// Log output format
    pub log_format: LogFormat,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Redis host name
    pub host: String,
    /// Redis port
    pub port: u16,
}

/// Delay configuration applied by the favorites handlers
#[derive(Debug, Clone, Default)]
pub struct DelayConfig {
    /// Sleep applied before every `/favorites` request
    pub request_delay: Duration,
    /// Canary fault injection applied to toggles
    pub canary: Canary,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let canary_delay_ms: u64 = parse_or(&lookup, "TOGGLE_CANARY_DELAY", 0);
        let failure_rate: f64 = parse_or(&lookup, "TOGGLE_CANARY_FAILURE", 0.0);

        Self {
            server: ServerConfig {
                port: parse_or(&lookup, "APPLICATION_PORT", DEFAULT_SERVER_PORT),
                host: non_empty(&lookup, "APPLICATION_HOST")
                    .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            },
            store: StoreConfig {
                host: non_empty(&lookup, "REDIS_HOST")
                    .unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
                port: parse_or(&lookup, "REDIS_PORT", DEFAULT_REDIS_PORT),
            },
            delays: DelayConfig {
                request_delay: Duration::from_millis(parse_or(
                    &lookup,
                    "TOGGLE_SERVICE_DELAY",
                    0,
                )),
                canary: Canary::new(Duration::from_millis(canary_delay_ms), failure_rate),
            },
            log_format: lookup("LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl StoreConfig {
    /// Connection URL for database 0 without credentials.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
