//! CLI command definitions
//!
//! Defines the clap commands for the Selenese runner.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every test case of a YAML suite
    Run {
        /// Path to the YAML suite file
        suite: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Number of test cases to run at once (overrides the config file)
        #[arg(long, short)]
        parallel: Option<usize>,

        /// Stop scheduling test cases after the first abort
        #[arg(long)]
        fail_fast: bool,
    },

    /// Resolve every script in a suite without running it
    Check {
        /// Path to the YAML suite file
        suite: PathBuf,
    },

    /// List the commands scripts can use
    #[command(name = "commands")]
    List {
        /// Only show commands whose name contains this text
        #[arg(long, short)]
        filter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
