//! rulewatch CLI
//!
//! Command-line interface for capturing rule lists and reading their history

use clap::{Parser, Subcommand};
use rulewatch_core::logging_facility::{init, Profile};
use rulewatch_engine::RuleWatchConfig;
use std::path::PathBuf;

mod commands;
mod sources;

#[derive(Debug, Parser)]
#[command(name = "rulewatch")]
#[command(about = "rulewatch - Track changes to filter rule lists", long_about = None)]
struct Cli {
    /// SQLite database path (overrides configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every source once and reconcile its rules
    Capture(commands::capture::CaptureArgs),
    /// List the snapshots of a source
    Snapshots(commands::snapshots::SnapshotsArgs),
    /// Print the live rules of a source
    Live(commands::live::LiveArgs),
}

fn load_config(cli: &Cli) -> anyhow::Result<RuleWatchConfig> {
    let mut config = RuleWatchConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match load_config(&cli) {
        Ok(config) => match cli.command {
            Commands::Capture(args) => commands::capture::execute(args, &config).await,
            Commands::Snapshots(args) => commands::snapshots::execute(args, &config),
            Commands::Live(args) => commands::live::execute(args, &config),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
