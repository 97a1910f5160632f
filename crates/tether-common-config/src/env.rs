//! Environment variable handling.

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    // Mode
    pub const TETHER_ENV: &str = "TETHER_ENV";
    pub const TETHER_CONFIG_PATH: &str = "TETHER_CONFIG_PATH";

    // Database
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const TETHER_DB_MAX_CONNECTIONS: &str = "TETHER_DB_MAX_CONNECTIONS";
    pub const TETHER_DB_MIN_CONNECTIONS: &str = "TETHER_DB_MIN_CONNECTIONS";
    pub const TETHER_DB_ACQUIRE_TIMEOUT_SECS: &str = "TETHER_DB_ACQUIRE_TIMEOUT_SECS";
    pub const TETHER_DB_SLOW_CALL_MS: &str = "TETHER_DB_SLOW_CALL_MS";
    pub const TETHER_DB_CREATE_IF_MISSING: &str = "TETHER_DB_CREATE_IF_MISSING";

    // Logging
    pub const TETHER_LOG_LEVEL: &str = "TETHER_LOG_LEVEL";
    pub const TETHER_LOG_FORMAT: &str = "TETHER_LOG_FORMAT";
    pub const TETHER_LOG_FILE: &str = "TETHER_LOG_FILE";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment access.
pub struct Environment {
    rejected: Vec<PathBuf>,
}

impl Environment {
    /// Load `.env`, `.env.local` and `.env.<TETHER_ENV>`. Variables already
    /// set win, so earlier files take precedence over later ones. Missing
    /// files are skipped.
    pub fn init() -> Result<Self, EnvError> {
        let mut files = vec![PathBuf::from(".env"), PathBuf::from(".env.local")];
        if let Ok(mode) = env::var(vars::TETHER_ENV) {
            files.push(PathBuf::from(format!(".env.{}", mode.trim())));
        }

        let rejected = files
            .into_iter()
            .filter(|path| !Self::load_file(path) && path.exists())
            .collect();

        Ok(Self { rejected })
    }

    /// Files that exist but could not be parsed during [`Environment::init`].
    pub fn rejected_files(&self) -> &[PathBuf] {
        &self.rejected
    }

    /// Load one dotenv file without overriding variables already set.
    ///
    /// Returns whether the file was read in full. A missing file is skipped
    /// quietly; a malformed one is reported and whatever parsed before the
    /// bad line stays applied.
    pub fn load_file(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match dotenvy::from_path(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Loaded environment file");
                true
            }
            Err(e) if e.not_found() => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load environment file");
                false
            }
        }
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        env::var(var).unwrap_or_else(|_| default.to_string())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: format!("expected integer, got {v:?}"),
            }),
            Err(_) => Ok(None),
        }
    }
}
