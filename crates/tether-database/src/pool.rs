use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::Duration;
use tether_common_config::DatabaseSection;
use thiserror::Error;
use tracing::{info, instrument};

use crate::options::ClientOptions;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to create connection pool: {0}")]
    Creation(#[from] sqlx::Error),

    #[error("Pool health check failed: {0}")]
    HealthCheck(String),

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to disconnect: {0}")]
    Disconnect(String),
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// SQLite connection URL
    pub url: String,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection acquire timeout
    pub acquire_timeout: Duration,
    /// Idle connection timeout
    pub idle_timeout: Option<Duration>,
    /// Maximum connection lifetime
    pub max_lifetime: Option<Duration>,
    /// Enable WAL mode for better concurrency
    pub wal_mode: bool,
    /// Busy timeout for locked database
    pub busy_timeout: Duration,
    /// Create database if not exists
    pub create_if_missing: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_section(&DatabaseSection::default())
    }
}

impl PoolConfig {
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    pub fn from_section(section: &DatabaseSection) -> Self {
        let in_memory = section.url.contains(":memory:");
        Self {
            url: section.url.clone(),
            min_connections: section.min_connections,
            max_connections: section.max_connections,
            acquire_timeout: Duration::from_secs(section.acquire_timeout_secs),
            idle_timeout: Some(Duration::from_secs(section.idle_timeout_secs)),
            max_lifetime: Some(Duration::from_secs(section.max_lifetime_secs)),
            wal_mode: !in_memory,
            busy_timeout: Duration::from_secs(5),
            create_if_missing: section.create_if_missing,
        }
    }

    /// Single-connection in-memory database. The connection is never
    /// recycled, so its contents live as long as the pool.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            idle_timeout: None,
            max_lifetime: None,
            wal_mode: false,
            ..Self::from_section(&DatabaseSection::default())
        }
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.url.trim().is_empty() {
            return Err(PoolError::InvalidConfig("url must not be empty".to_string()));
        }

        if self.min_connections > self.max_connections {
            return Err(PoolError::InvalidConfig(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(PoolError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.config.min_connections = min;
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.config.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.config.max_lifetime = lifetime;
        self
    }

    pub fn wal_mode(mut self, enabled: bool) -> Self {
        self.config.wal_mode = enabled;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout = timeout;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    pub fn build(self) -> Result<PoolConfig, PoolError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// SQLite connection pool, the base client every handle wraps.
pub struct DatabasePool {
    pool: SqlitePool,
    config: PoolConfig,
}

impl DatabasePool {
    /// Open the pool with statement logging matched to `options`.
    #[instrument(skip_all, fields(url = %config.url, mode = %options.mode))]
    pub async fn connect(config: PoolConfig, options: &ClientOptions) -> Result<Self, PoolError> {
        config.validate()?;

        let connect_options = Self::build_connect_options(&config, options)?;

        let pool = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(connect_options)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db_pool = Self { pool, config };
        db_pool.health_check().await?;

        Ok(db_pool)
    }

    fn build_connect_options(
        config: &PoolConfig,
        options: &ClientOptions,
    ) -> Result<SqliteConnectOptions, PoolError> {
        let mut connect = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| PoolError::InvalidConfig(e.to_string()))?
            .create_if_missing(config.create_if_missing)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true)
            .log_statements(options.statement_log_level())
            .log_slow_statements(options.slow_statement_log_level(), options.slow_call_threshold);

        if config.wal_mode {
            connect = connect.journal_mode(SqliteJournalMode::Wal);
        }

        Ok(connect)
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), PoolError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PoolError::HealthCheck(e.to_string()))?;

        Ok(())
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_connections: self.config.max_connections,
        }
    }

    /// Close every connection. Closing an already closed pool is a no-op.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        info!("Closing database pool");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
    pub max_connections: u32,
}

impl PoolStats {
    pub fn utilization(&self) -> f64 {
        if self.max_connections == 0 {
            return 0.0;
        }
        (self.size as f64 - self.idle as f64) / self.max_connections as f64
    }
}
