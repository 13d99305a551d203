pub mod app_config;
pub mod cli;

pub use app_config::{AppConfig, Settings};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "datapush")]
#[command(about = "Replays JSON and CSV data files into a web API on a schedule")]
pub struct CliArgs {
    /// Path to the JSON (or .toml) configuration file
    #[arg(default_value = "config.json")]
    pub config: PathBuf,

    /// Directory for run log files
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log to the console only
    #[arg(long)]
    pub no_log_file: bool,

    /// Validate the configuration and list what would be sent, without sending
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
