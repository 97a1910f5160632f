//! Configuration file loading and parsing.

use crate::env::{vars, EnvError, Environment};
use crate::types::TetherConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tether.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    path: PathBuf,
    required: bool,
}

impl ConfigLoader {
    /// Loader for an optional config file. A missing file yields defaults.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: false,
        }
    }

    /// Loader for a file that must exist.
    pub fn required(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// Loader for `TETHER_CONFIG_PATH` if set (required), else `tether.yaml`
    /// (optional).
    pub fn from_env() -> Self {
        match Environment::get(vars::TETHER_CONFIG_PATH) {
            Some(path) => Self::required(path),
            None => Self::new(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file, apply environment overrides and validate.
    pub fn load(&self) -> Result<TetherConfig, ConfigError> {
        let mut config = self.load_file()?;
        apply_env_overrides(&mut config)?;
        validate(&config)?;
        Ok(config)
    }

    fn load_file(&self) -> Result<TetherConfig, ConfigError> {
        if !self.path.exists() {
            if self.required {
                return Err(ConfigError::NotFound {
                    path: self.path.clone(),
                });
            }
            return Ok(TetherConfig::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let expanded = expand_env_vars(&contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid");
    let mut result = content.to_string();

    for cap in re.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match default {
            Some(d) => Environment::get_or(var_name, d),
            None => Environment::require(var_name).map_err(|_| ConfigError::EnvVarNotFound {
                var: var_name.to_string(),
            })?,
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Overlay `DATABASE_URL`, `TETHER_DB_*` and `TETHER_LOG_*` onto `config`.
///
/// Integer settings that fail to parse are an error rather than ignored.
pub fn apply_env_overrides(config: &mut TetherConfig) -> Result<(), ConfigError> {
    if let Some(url) = Environment::get(vars::DATABASE_URL) {
        config.database.url = url;
    }
    if let Some(max) = Environment::get_int(vars::TETHER_DB_MAX_CONNECTIONS)? {
        config.database.max_connections = max;
    }
    if let Some(min) = Environment::get_int(vars::TETHER_DB_MIN_CONNECTIONS)? {
        config.database.min_connections = min;
    }
    if let Some(secs) = Environment::get_int(vars::TETHER_DB_ACQUIRE_TIMEOUT_SECS)? {
        config.database.acquire_timeout_secs = secs;
    }
    if let Some(ms) = Environment::get_int(vars::TETHER_DB_SLOW_CALL_MS)? {
        config.database.slow_call_ms = ms;
    }
    if let Some(create) = Environment::get_bool(vars::TETHER_DB_CREATE_IF_MISSING) {
        config.database.create_if_missing = create;
    }
    if let Some(level) = Environment::get(vars::TETHER_LOG_LEVEL) {
        config.logging.level = Some(level);
    }
    if let Some(format) = Environment::get(vars::TETHER_LOG_FORMAT) {
        config.logging.format = Some(format);
    }
    if let Some(file) = Environment::get(vars::TETHER_LOG_FILE) {
        config.logging.file = Some(file);
    }
    Ok(())
}

/// Validate configuration values.
pub fn validate(config: &TetherConfig) -> Result<(), ConfigError> {
    let db = &config.database;

    if db.url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            message: "database.url must not be empty".to_string(),
        });
    }

    if db.max_connections == 0 {
        return Err(ConfigError::ValidationError {
            message: "database.max_connections must be at least 1".to_string(),
        });
    }

    if db.min_connections > db.max_connections {
        return Err(ConfigError::ValidationError {
            message: "database.min_connections cannot exceed database.max_connections".to_string(),
        });
    }

    Ok(())
}
