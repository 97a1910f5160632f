//! CLI error type and exit codes.

use std::process::ExitCode;

use tether_common_config::ConfigError;
use tether_common_log::LogError;
use tether_database::PoolError;
use thiserror::Error;

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    Interrupted = 130,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("database error: {0}")]
    Database(#[from] PoolError),

    #[error("database unhealthy: {0}")]
    Unhealthy(String),
}

impl CliError {
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Config(_) => Exit::ConfigError,
            Self::Database(PoolError::InvalidConfig(_)) => Exit::ConfigError,
            Self::Log(_) | Self::Database(_) | Self::Unhealthy(_) => Exit::GeneralError,
        }
    }
}
