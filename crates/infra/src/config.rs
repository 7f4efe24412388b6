//! Configuration loading and representation.
//!
//! Everything comes from the process environment and is read once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use stockcast_ai::{DEFAULT_LOOKBACK_DAYS, DEFAULT_MODEL_NAME};

pub const ENV_BIND_ADDR: &str = "STOCKCAST_BIND_ADDR";
pub const ENV_MODEL_NAME: &str = "STOCKCAST_MODEL_NAME";
pub const ENV_LOOKBACK_DAYS: &str = "STOCKCAST_LOOKBACK_DAYS";
pub const ENV_REGISTRY_CACHE_SECS: &str = "STOCKCAST_REGISTRY_CACHE_SECS";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Upper bound on the aggregation window (100 years).
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Model used when a request does not name one.
    pub model_name: String,
    pub lookback_days: u32,
    /// Zero disables the registry cache.
    pub registry_cache_ttl: Duration,
    pub database_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            registry_cache_ttl: Duration::from_secs(30),
            database_url: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let lookback_days: u32 =
            parse_or(get(ENV_LOOKBACK_DAYS), ENV_LOOKBACK_DAYS, defaults.lookback_days)?;
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::Invalid {
                key: ENV_LOOKBACK_DAYS,
                value: lookback_days.to_string(),
                reason: format!("must be at most {MAX_LOOKBACK_DAYS}"),
            });
        }

        let cache_secs: u64 =
            parse_or(get(ENV_REGISTRY_CACHE_SECS), ENV_REGISTRY_CACHE_SECS, 30)?;

        Ok(Self {
            bind_addr: parse_or(get(ENV_BIND_ADDR), ENV_BIND_ADDR, defaults.bind_addr)?,
            model_name: get(ENV_MODEL_NAME).unwrap_or(defaults.model_name),
            lookback_days,
            registry_cache_ttl: Duration::from_secs(cache_secs),
            database_url: get(ENV_DATABASE_URL),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
