//! Application configuration loaded from environment variables.

use std::time::Duration;

use cart_store::CartStoreConfig;
use checkout::StepTimeouts;
use common::CurrencyCode;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `REDIS_ADDR`: cart store address; unset keeps carts in memory
/// - `REDIS_CONNECT_TIMEOUT_MS`: Redis handshake bound (default: `5000`)
/// - `CHECKOUT_CALL_TIMEOUT_MS`: bound on each downstream call (default: `5000`)
/// - `SHIPPING_FLAT_FEE_CENTS`: demo shipping fee (default: `899`)
/// - `CATALOG_CURRENCY`: currency of the demo catalog (default: `USD`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub redis_addr: Option<String>,
    pub redis_connect_timeout: Duration,
    pub call_timeout: Duration,
    pub shipping_flat_fee_cents: u64,
    pub catalog_currency: CurrencyCode,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            redis_addr: lookup("REDIS_ADDR").filter(|addr| !addr.trim().is_empty()),
            redis_connect_timeout: millis("REDIS_CONNECT_TIMEOUT_MS", defaults.redis_connect_timeout),
            call_timeout: millis("CHECKOUT_CALL_TIMEOUT_MS", defaults.call_timeout),
            shipping_flat_fee_cents: lookup("SHIPPING_FLAT_FEE_CENTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shipping_flat_fee_cents),
            catalog_currency: lookup("CATALOG_CURRENCY")
                .and_then(|v| CurrencyCode::new(v).ok())
                .unwrap_or(defaults.catalog_currency),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cart_store(&self) -> CartStoreConfig {
        CartStoreConfig {
            redis_addr: self.redis_addr.clone(),
            connect_timeout: self.redis_connect_timeout,
        }
    }

    pub fn step_timeouts(&self) -> StepTimeouts {
        StepTimeouts::new(self.call_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            redis_addr: None,
            redis_connect_timeout: Duration::from_millis(5000),
            call_timeout: Duration::from_millis(5000),
            shipping_flat_fee_cents: 899,
            catalog_currency: CurrencyCode::usd(),
        }
    }
}
