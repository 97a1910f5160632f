//! Tether CLI
//!
//! Main entry point for the `tether` binary.

use std::process::ExitCode;

use clap::Parser;
use tether_common_config::{ConfigLoader, Environment, RuntimeMode};
use tether_common_log::{LogConfig, LogLevel};
use tracing::error;

mod cli;
mod commands;
mod error;

use cli::{Cli, Command};
use commands::CommandContext;
use error::{CliError, Exit};

fn main() -> ExitCode {
    // `.env` files must be loaded before anything reads the environment.
    let env = match Environment::init() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Error: {e}");
            return Exit::ConfigError.into();
        }
    };
    // Logging is not up yet, so report unreadable `.env` files directly.
    for path in env.rejected_files() {
        eprintln!("Warning: could not parse {}, skipped", path.display());
    }

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            e.exit_code().into()
        }
    }
}

async fn run(cli: Cli) -> Result<Exit, CliError> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::required(path),
        None => ConfigLoader::from_env(),
    };
    let mut config = loader.load()?;
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }

    let mode = cli.mode.unwrap_or_else(RuntimeMode::from_env);

    let mut log_config = LogConfig::for_mode(mode).with_section(&config.logging);
    match cli.verbose {
        0 => {}
        1 => log_config.level = LogLevel::Debug,
        _ => log_config.level = LogLevel::Trace,
    }
    tether_common_log::init(log_config)?;

    let ctx = CommandContext::new(config, mode);
    match &cli.command {
        Command::Check(cmd) => cmd.execute(&ctx).await,
        Command::Serve(cmd) => cmd.execute(&ctx).await,
    }
}
