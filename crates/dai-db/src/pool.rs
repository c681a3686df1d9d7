//! Connection pool for the archive database.
//!
//! Sizing comes from `DATABASE_*` environment variables through
//! [`PoolConfig::from_lookup`]; the server keeps a background monitor
//! ([`spawn_pool_monitor`]) that reports pool pressure at a fixed period.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use dai_core::{Error, Result};

/// Default maximum number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default minimum number of connections kept open.
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default acquire timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default connection lifetime in seconds (30 minutes).
pub const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Sizing and timeouts for the archive pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound on open connections. The audit export holds one
    /// connection for the listing and one per live-usage lookup.
    pub max_connections: u32,
    /// Connections kept warm; never above `max_connections`.
    pub min_connections: u32,
    /// How long a request waits to acquire a connection.
    pub connect_timeout: Duration,
    /// Idle connections above the minimum are closed after this.
    pub idle_timeout: Duration,
    /// Connections are recycled after this age; `None` keeps them.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime: Some(Duration::from_secs(DEFAULT_MAX_LIFETIME_SECS)),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `DATABASE_MAX_CONNECTIONS`, `DATABASE_MIN_CONNECTIONS`,
    /// `DATABASE_CONNECT_TIMEOUT_SECS`, `DATABASE_IDLE_TIMEOUT_SECS` and
    /// `DATABASE_MAX_LIFETIME_SECS` (`0` disables recycling).
    ///
    /// Unparseable values keep the default. A zero maximum is rejected.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secs = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };
        let count = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u32>().ok());

        let defaults = Self::default();
        let max_connections = count("DATABASE_MAX_CONNECTIONS").unwrap_or(defaults.max_connections);
        if max_connections == 0 {
            return Err(Error::Config(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        let max_lifetime = match secs("DATABASE_MAX_LIFETIME_SECS") {
            Some(d) if d.is_zero() => None,
            Some(d) => Some(d),
            None => defaults.max_lifetime,
        };

        Ok(Self::new()
            .max_connections(max_connections)
            .min_connections(count("DATABASE_MIN_CONNECTIONS").unwrap_or(defaults.min_connections))
            .connect_timeout(secs("DATABASE_CONNECT_TIMEOUT_SECS").unwrap_or(defaults.connect_timeout))
            .idle_timeout(secs("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(defaults.idle_timeout))
            .max_lifetime(max_lifetime))
    }

    /// Set the maximum; the minimum follows it down if needed.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self.min_connections = self.min_connections.min(n);
        self
    }

    /// Set the minimum, capped at the current maximum.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n.min(self.max_connections);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }
}

/// Open a pool with [`PoolConfig::default`].
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Open a pool with explicit sizing.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        "Opening archive database pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout);

    if let Some(max_lifetime) = config.max_lifetime {
        options = options.max_lifetime(max_lifetime);
    }

    let pool = options
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Archive database pool established"
    );
    Ok(pool)
}

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolHealth {
    pub size: u32,
    pub idle: usize,
}

impl PoolHealth {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle(),
        }
    }

    /// Every open connection is checked out.
    pub fn is_saturated(&self) -> bool {
        self.size > 0 && self.idle == 0
    }
}

/// Log pool occupancy at DEBUG, or WARN when saturated.
pub fn log_pool_metrics(pool: &PgPool) -> PoolHealth {
    let health = PoolHealth::of(pool);

    if health.is_saturated() {
        warn!(
            subsystem = "db",
            component = "pool",
            op = "metrics",
            pool_size = health.size,
            "Archive pool saturated; requests are waiting for connections"
        );
    } else {
        debug!(
            subsystem = "db",
            component = "pool",
            op = "metrics",
            pool_size = health.size,
            pool_idle = health.idle,
            "Pool health check"
        );
    }
    health
}

/// Log pool metrics every `period` until the runtime shuts down.
pub fn spawn_pool_monitor(pool: PgPool, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if pool.is_closed() {
                debug!(subsystem = "db", component = "pool", "Pool closed, monitor stopping");
                break;
            }
            log_pool_metrics(&pool);
        }
    })
}
