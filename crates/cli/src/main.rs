//! Corretaje CLI - back-office session client

mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, error};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "corretaje")]
#[command(about = "Sign in to the brokerage back office and inspect the session")]
#[command(version)]
struct Cli {
    /// Set logging level (defaults to the configured `log_level`)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    /// Configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Back-office API origin, overriding `api.host`
    #[arg(long, global = true)]
    api_host: Option<String>,

    /// Directory holding the session file, overriding `state_dir`
    #[arg(short = 'd', long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(api_host) = cli.api_host {
        settings.api.host = api_host;
    }
    if let Some(state_dir) = cli.state_dir {
        settings.state_dir = Some(state_dir);
    }

    let log_level = cli
        .log_level
        .map(Level::from)
        .unwrap_or_else(|| settings.log_level());
    logging::init_logging(log_level)?;

    if let Err(e) = cli.command.execute(&settings).await {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

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
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
