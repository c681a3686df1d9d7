//! Server configuration from the environment.
//!
//! `.env` is loaded by `main` before [`ApiConfig::from_env`] runs.

use std::str::FromStr;

use dai_core::defaults::{
    NOTES_PAGE_LIMIT, PRIVATE_FILES_PATH, PUBLIC_FILES_PATH, RATE_LIMIT_PERIOD_SECS,
    RATE_LIMIT_REQUESTS, SERVER_PORT,
};
use dai_core::{Error, Result};
use dai_db::PoolConfig;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/dai";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_POOL_MONITOR_SECS: u64 = 60;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub pool: PoolConfig,
    /// Period of the pool metrics log; `0` disables the monitor.
    pub pool_monitor_secs: u64,
    pub host: String,
    pub port: u16,
    /// Scheme and host used to build absolute file URLs; empty disables
    /// storage-URI resolution.
    pub site_base_url: String,
    pub public_files_path: String,
    pub private_files_path: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_period_secs: u64,
    pub notes_page_limit: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool: PoolConfig::default(),
            pool_monitor_secs: DEFAULT_POOL_MONITOR_SECS,
            host: "0.0.0.0".to_string(),
            port: SERVER_PORT,
            site_base_url: String::new(),
            public_files_path: PUBLIC_FILES_PATH.to_string(),
            private_files_path: PRIVATE_FILES_PATH.to_string(),
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            rate_limit_enabled: true,
            rate_limit_requests: RATE_LIMIT_REQUESTS,
            rate_limit_period_secs: RATE_LIMIT_PERIOD_SECS,
            notes_page_limit: NOTES_PAGE_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Read configuration from environment variables.
    ///
    /// Unparseable numbers fall back to defaults; a zero rate-limit quota is
    /// rejected since it would block every request.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            pool: PoolConfig::from_lookup(&lookup)?,
            pool_monitor_secs: parse_var(&lookup, "DATABASE_POOL_MONITOR_SECS")
                .unwrap_or(defaults.pool_monitor_secs),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            site_base_url: lookup("SITE_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_base_url),
            public_files_path: lookup("PUBLIC_FILES_PATH").unwrap_or(defaults.public_files_path),
            private_files_path: lookup("PRIVATE_FILES_PATH")
                .unwrap_or(defaults.private_files_path),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .filter(|o| !o.is_empty())
                .unwrap_or(defaults.allowed_origins),
            rate_limit_enabled: lookup("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.rate_limit_enabled),
            rate_limit_requests: parse_var(&lookup, "RATE_LIMIT_REQUESTS")
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_period_secs: parse_var(&lookup, "RATE_LIMIT_PERIOD_SECS")
                .unwrap_or(defaults.rate_limit_period_secs),
            notes_page_limit: parse_var(&lookup, "NOTES_PAGE_LIMIT").unwrap_or(defaults.notes_page_limit),
        };

        if config.rate_limit_enabled
            && (config.rate_limit_requests == 0 || config.rate_limit_period_secs == 0)
        {
            return Err(Error::Config(
                "RATE_LIMIT_REQUESTS and RATE_LIMIT_PERIOD_SECS must be non-zero".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
