//! Production vs. development selection.

use crate::env::{vars, Environment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which behavior profile the process runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    Production,
    #[default]
    Development,
}

impl RuntimeMode {
    /// Interpret a raw `TETHER_ENV` value. Only `production` selects
    /// production; anything else, including absence, is development.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "production" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Read the mode flag from the environment.
    ///
    /// Call this once at startup and pass the result along.
    pub fn from_env() -> Self {
        Self::parse(Environment::get(vars::TETHER_ENV).as_deref())
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}
