use crate::errors::{Error, Result};
use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://sensor.db";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Runtime settings, read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub http_addr: String,
    pub db_max_connections: u32,
    pub db_busy_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let db_max_connections: u32 = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let busy_timeout_ms: u64 = lookup("DB_BUSY_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);

        if db_max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            http_addr,
            db_max_connections,
            db_busy_timeout: Duration::from_millis(busy_timeout_ms),
        })
    }
}
