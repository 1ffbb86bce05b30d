//! Configuration Module
//!
//! Handles loading the store connection and server settings from environment variables.

use std::env;
use std::str::FromStr;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

/// Which key-value store backs the cache and the check-in tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Remote Redis server
    Redis,
    /// In-process store, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis host name or address
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Redis logical database index
    pub redis_db: i64,
    /// Redis password, None when the server has no auth
    pub redis_password: Option<String>,
    /// Default TTL in seconds for cache writes, 0 = no expiration
    pub default_ttl: u64,
    /// Key prefix for the daily check-in bitmaps
    pub check_in_prefix: String,
    /// HTTP server port
    pub server_port: u16,
    /// Memory backend cleanup interval in seconds
    pub cleanup_interval: u64,
    /// Store backend selection
    pub backend: StoreBackend,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_DB` - Redis database index (default: 1)
    /// - `REDIS_PASSWORD` - Redis password (default: none)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 disables expiry (default: 0)
    /// - `CHECK_IN_PREFIX` - Check-in bitmap key prefix (default: `_check_in_`)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Memory backend cleanup frequency in seconds (default: 1)
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_db: parse_var("REDIS_DB").unwrap_or(defaults.redis_db),
            redis_password: env::var("REDIS_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            check_in_prefix: env::var("CHECK_IN_PREFIX").unwrap_or(defaults.check_in_prefix),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            backend: parse_var("STORE_BACKEND").unwrap_or(defaults.backend),
        }
    }

    /// Connection settings for `redis::Client::open`.
    ///
    /// Built field by field so passwords containing URL delimiters such as
    /// `/`, `#` or `@` reach the server unchanged.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.redis_host.clone(), self.redis_port),
            redis: RedisConnectionInfo {
                db: self.redis_db,
                password: self.redis_password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_db: 1,
            redis_password: None,
            default_ttl: 0,
            check_in_prefix: crate::checkin::DEFAULT_PREFIX.to_string(),
            server_port: 3000,
            cleanup_interval: 1,
            backend: StoreBackend::Redis,
        }
    }
}
