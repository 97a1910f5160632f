//! Per-mode client options: which call levels are logged and how errors
//! are rendered.

use std::fmt;
use std::time::Duration;
use tether_common_config::{DatabaseSection, RuntimeMode};

use crate::hook::Failure;

/// Severity of a call log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallLevel {
    Info,
    Warn,
    Error,
}

impl CallLevel {
    const ALL: [CallLevel; 3] = [CallLevel::Info, CallLevel::Warn, CallLevel::Error];

    fn bit(self) -> u8 {
        match self {
            Self::Info => 0b001,
            Self::Warn => 0b010,
            Self::Error => 0b100,
        }
    }
}

impl fmt::Display for CallLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warn => f.write_str("warn"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Set of enabled call levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogLevelSet {
    bits: u8,
}

impl LogLevelSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// `{warn, error}` in production, `{info, warn, error}` otherwise.
    pub fn for_mode(mode: RuntimeMode) -> Self {
        let set = Self::empty().with(CallLevel::Warn).with(CallLevel::Error);
        match mode {
            RuntimeMode::Production => set,
            RuntimeMode::Development => set.with(CallLevel::Info),
        }
    }

    #[must_use]
    pub fn with(mut self, level: CallLevel) -> Self {
        self.bits |= level.bit();
        self
    }

    #[must_use]
    pub fn without(mut self, level: CallLevel) -> Self {
        self.bits &= !level.bit();
        self
    }

    pub fn contains(&self, level: CallLevel) -> bool {
        self.bits & level.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Enabled levels, lowest severity first.
    pub fn iter(&self) -> impl Iterator<Item = CallLevel> + '_ {
        CallLevel::ALL.into_iter().filter(|l| self.contains(*l))
    }
}

/// How error details are rendered in failure log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorFormat {
    /// The error's `Display` text.
    Minimal,
    /// Multi-line `Debug` rendering.
    #[default]
    Pretty,
}

impl ErrorFormat {
    pub fn for_mode(mode: RuntimeMode) -> Self {
        match mode {
            RuntimeMode::Production => Self::Minimal,
            RuntimeMode::Development => Self::Pretty,
        }
    }

    pub fn render(&self, error: &dyn Failure) -> String {
        match self {
            Self::Minimal => error.to_string(),
            Self::Pretty => format!("{error:#?}"),
        }
    }
}

/// Options a client handle is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub mode: RuntimeMode,
    pub levels: LogLevelSet,
    pub error_format: ErrorFormat,
    /// Successful calls slower than this are also reported at warn level.
    pub slow_call_threshold: Duration,
}

impl ClientOptions {
    pub const DEFAULT_SLOW_CALL: Duration = Duration::from_millis(1000);

    pub fn for_mode(mode: RuntimeMode) -> Self {
        Self {
            mode,
            levels: LogLevelSet::for_mode(mode),
            error_format: ErrorFormat::for_mode(mode),
            slow_call_threshold: Self::DEFAULT_SLOW_CALL,
        }
    }

    /// Mode defaults with the slow-call threshold taken from config.
    pub fn from_section(mode: RuntimeMode, section: &DatabaseSection) -> Self {
        Self::for_mode(mode).with_slow_call_threshold(Duration::from_millis(section.slow_call_ms))
    }

    #[must_use]
    pub fn with_slow_call_threshold(mut self, threshold: Duration) -> Self {
        self.slow_call_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: LogLevelSet) -> Self {
        self.levels = levels;
        self
    }

    /// Level sqlx uses for per-statement logging: on only when info-level
    /// call logging is.
    pub fn statement_log_level(&self) -> log::LevelFilter {
        if self.levels.contains(CallLevel::Info) {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Off
        }
    }

    /// Level sqlx uses for slow-statement warnings.
    pub fn slow_statement_log_level(&self) -> log::LevelFilter {
        if self.levels.contains(CallLevel::Warn) {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Off
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::for_mode(RuntimeMode::default())
    }
}
