//! Storefront CLI - browse the catalog and manage an account from the terminal

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use storefront_client::ClientError;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront command-line client")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, global = true, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// API origin, overriding the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Data directory for the session file and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into(), cli.data_dir.clone(), cli.no_file_log)?;

    let settings = config::resolve(
        cli.config.as_deref(),
        cli.api_url.clone(),
        cli.data_dir.clone(),
    )?;
    info!(api_url = %settings.api_url, "Starting storefront CLI");

    let outcome = if cli.timeout == 0 {
        cli.command.execute(settings).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(settings)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        if e
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_auth_expired)
        {
            eprintln!("Your session has expired. Run `storefront login` to sign in again.");
        }
        std::process::exit(1);
    }

    info!("Command completed successfully");
    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
