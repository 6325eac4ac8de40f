//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ip_locator` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ip_locator::app::{
    clear_history, delete_from_history, list_history, print_history, print_history_report,
    print_locate_report, run_locate,
};
use ip_locator::config::{
    DEFAULT_HISTORY_DIR, DEFAULT_PROVIDER_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    IPINFO_TOKEN_ENV,
};
use ip_locator::initialization::init_logger_with;
use ip_locator::{Config, LogFormat, LogLevel};

#[derive(Debug, Parser)]
#[command(
    name = "ip_locator",
    about = "Looks up where an IP address is, and remembers what you looked up."
)]
struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Log format: plain or json
    #[arg(long, value_enum, default_value = "plain", global = true)]
    log_format: LogFormat,

    /// Directory holding the lookup history
    #[arg(long, value_parser, default_value = DEFAULT_HISTORY_DIR, global = true)]
    history_dir: PathBuf,

    /// Geolocation provider base URL
    #[arg(long, default_value = DEFAULT_PROVIDER_URL, global = true)]
    provider_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    user_agent: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Locate this machine, then optionally the given address
    Locate {
        /// IPv4 or IPv6 address to look up
        ip: Option<String>,
    },
    /// Inspect or edit the lookup history
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// List lookups, newest first
    List,
    /// Delete the entries for the given addresses
    Delete {
        #[arg(required = true)]
        ips: Vec<String>,
    },
    /// Delete every entry
    Clear,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            history_dir: self.history_dir.clone(),
            provider_url: self.provider_url.clone(),
            token: std::env::var(IPINFO_TOKEN_ENV).ok(),
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting IPINFO_TOKEN in .env without exporting it manually
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(&cli.command, &config).await {
        eprintln!("ip_locator error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: &Command, config: &Config) -> Result<()> {
    match command {
        Command::Locate { ip } => {
            let report = run_locate(config, ip.as_deref()).await?;
            print_locate_report(&report);
            if let Some(error) = report.error {
                anyhow::bail!(error);
            }
        }
        Command::History(HistoryCommand::List) => print_history(&list_history(config)),
        Command::History(HistoryCommand::Delete { ips }) => {
            print_history_report(&delete_from_history(config, ips));
        }
        Command::History(HistoryCommand::Clear) => {
            print_history_report(&clear_history(config));
        }
    }
    Ok(())
}
