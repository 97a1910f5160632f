//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use tether_common_config::RuntimeMode;

use crate::commands::{CheckCommand, ServeCommand};

/// Tether - hosts one instrumented database handle and closes it cleanly on exit.
#[derive(Debug, Parser)]
#[command(name = "tether", version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file [default: $TETHER_CONFIG_PATH, else tether.yaml]
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Database URL, overriding config and DATABASE_URL
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub database_url: Option<String>,

    /// Runtime mode, overriding TETHER_ENV
    #[arg(long = "env", global = true, value_parser = parse_mode)]
    pub mode: Option<RuntimeMode>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect, run one health check, disconnect
    Check(CheckCommand),

    /// Hold the handle open until SIGINT/SIGTERM
    Serve(ServeCommand),
}

fn parse_mode(raw: &str) -> Result<RuntimeMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "production" => Ok(RuntimeMode::Production),
        "development" => Ok(RuntimeMode::Development),
        other => Err(format!("unknown mode {other:?}, expected production or development")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_globals() {
        let cli = Cli::try_parse_from([
            "tether",
            "--env",
            "production",
            "--database-url",
            "sqlite::memory:",
            "check",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(RuntimeMode::Production));
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
        match cli.command {
            Command::Check(cmd) => assert!(cmd.json),
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["tether", "serve", "--interval", "5", "--once", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.interval, 5);
                assert!(cmd.once);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["tether", "--env", "staging", "check"]).is_err());
    }
}
