//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use colored::Colorize;
use std::path::Path;

use crate::browser;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing::{self, CheckReport, SuiteReport};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Run {
            suite,
            json,
            parallel,
            fail_fast,
        } => {
            if let Some(n) = parallel {
                config.runner.parallelism = n.max(1);
            }
            config.runner.fail_fast |= fail_fast;

            let report = testing::run_suite(&suite, &config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_suite_report(&report);
            }

            if report.is_success() {
                Ok(())
            } else {
                Err(Error::SuiteFailed {
                    failed: report.results.failed,
                    aborted: report.aborted.len(),
                    skipped: report.skipped,
                })
            }
        }

        Commands::Check { suite } => {
            let checks = testing::check_suite(&suite, &config)?;
            print_checks(&suite, &checks);

            let broken = checks.iter().filter(|c| c.error.is_some()).count();
            if broken == 0 {
                Ok(())
            } else {
                Err(Error::SuiteFailed {
                    failed: 0,
                    aborted: broken,
                    skipped: 0,
                })
            }
        }

        Commands::List { filter, json } => {
            let catalog = browser::catalog(&config.catalog)?;
            let entries: Vec<_> = catalog
                .iter()
                .filter(|f| filter.as_deref().map_or(true, |s| f.command().contains(s)))
                .collect();

            if json {
                let list: Vec<_> = entries
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "command": f.command(),
                            "kind": f.kind().to_string(),
                            "method": f.method().name,
                            "arity": f.method().arity,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else if entries.is_empty() {
                println!("No matching commands");
            } else {
                for f in &entries {
                    println!(
                        "  {:<36} {:<8} {}",
                        f.command(),
                        f.kind().to_string().dimmed(),
                        f.method()
                    );
                }
                println!();
                println!("{} of {} commands", entries.len(), catalog.len());
            }

            Ok(())
        }
    }
}

fn print_suite_report(report: &SuiteReport) {
    println!();
    println!("{} {}", "Suite:".bold(), report.name);
    println!();

    for case in &report.cases {
        if case.passed {
            println!(
                "  {} {} ({} steps)",
                "✓".green(),
                case.name,
                case.steps_total
            );
        } else {
            println!(
                "  {} {} (step {}/{})",
                "✗".red(),
                case.name,
                case.steps_run,
                case.steps_total
            );
            if let Some(failure) = &case.failure {
                println!("      {}", failure.red());
            }
        }
    }

    for aborted in &report.aborted {
        println!("  {} {} [{}]", "!".red().bold(), aborted.name, aborted.code);
        println!("      {}", aborted.error.red());
    }

    if report.skipped > 0 {
        println!(
            "  {}",
            format!("{} test case(s) not started", report.skipped).yellow()
        );
    }

    println!();
    let summary = format!(
        "{} passed, {} failed, {} aborted",
        report.results.passed,
        report.results.failed,
        report.aborted.len()
    );
    if report.is_success() {
        println!("{} {}", "✓".green().bold(), summary.green());
    } else {
        println!("{} {}", "✗".red().bold(), summary.red());
    }
}

fn print_checks(path: &Path, checks: &[CheckReport]) {
    println!("Checking {}", path.display());
    for check in checks {
        match &check.error {
            None => println!("  {} {} ({} steps)", "✓".green(), check.name, check.steps),
            Some(e) => {
                println!("  {} {}", "✗".red(), check.name);
                println!("      {}", e.red());
            }
        }
    }
}
