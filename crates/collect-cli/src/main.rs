//! Collect audit CLI - Command-line tools for form-entry audit logs
//!
//! Provides commands for:
//! - Listing events in an audit file
//! - Summarising time spent per question
//! - Viewing and validating configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use collect_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, show::ShowCommand, summary::SummaryCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "auditlog", version, about = "Inspect form-entry audit logs")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List events in an audit file
    Show(ShowCommand),
    /// Summarise an audit file
    Summary(SummaryCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // -v overrides the configured level
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Commands::Show(cmd) => cmd.execute(&config, format).await,
        Commands::Summary(cmd) => cmd.execute(&config, format).await,
        Commands::Config(cmd) => cmd.execute(&config_path, format).await,
    }
}
