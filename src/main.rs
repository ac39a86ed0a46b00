//! Selenese runner CLI
//!
//! Runs table-driven browser test scripts against a simulated site through a
//! command catalog derived from the browser's capabilities.

use clap::Parser;
use selenese::common::{config::Config, logging};
use selenese::{cli, commands::Commands};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "selenese", about = "Table-driven browser test runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let result = match config {
        Ok(config) => cli::dispatch(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
