//! Marquee CLI - Command-line interface
//!
//! Runs the web UI or searches the movie database from the terminal.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use marquee_core::MarqueeConfig;
use marquee_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Find movies you'll enjoy without the hassle")]
#[command(version)]
struct Cli {
    /// Console log level (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Directory for the full debug log of the last run
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    let config = MarqueeConfig::from_env();
    commands::handle_command(cli.command, config).await
}
