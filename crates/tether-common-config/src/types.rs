//! Configuration types.

use serde::{Deserialize, Serialize};

/// Root configuration, as read from `tether.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    /// Database connection settings.
    pub database: DatabaseSection,
    /// Logging overrides. Unset fields fall back to the runtime mode.
    pub logging: LoggingSection,
}

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Connection URL, e.g. `sqlite://data/app.db` or `sqlite::memory:`.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Calls slower than this are reported at warn level.
    pub slow_call_ms: u64,
    pub create_if_missing: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            slow_call_ms: 1000,
            create_if_missing: true,
        }
    }
}

/// Logging overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: Option<String>,
    /// `pretty`, `compact` or `json`.
    pub format: Option<String>,
    pub file: Option<String>,
}
