//! Configuration module.
//!
//! Loads configuration from environment variables (and `.env` if present).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Settings for the shared computed-value cache.
    pub cache: CacheConfig,

    // MongoDB
    /// When unset, entities are kept in memory.
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CacheConfig::default();

        let max_capacity = parse(&lookup, "CACHE_MAX_CAPACITY")?.unwrap_or(defaults.max_capacity);

        // 0 disables time-based expiry.
        let ttl = match parse::<u64, _>(&lookup, "CACHE_TTL_SECS")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.ttl,
        };

        let tti = parse::<u64, _>(&lookup, "CACHE_TTI_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let mongodb_uri = lookup("MONGODB_URI").filter(|s| !s.trim().is_empty());

        Ok(Self {
            cache: CacheConfig {
                max_capacity,
                ttl,
                tti,
            },
            mongodb_uri,
            mongodb_database: lookup("MONGODB_DATABASE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "captions".to_string()),
        })
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
