//! Test execution
//!
//! Runs test cases through the command catalog and reports their outcomes.
//! A suite file describes a simulated site and the script pages to run.

mod config;
mod runner;
mod suite;

pub use config::*;
pub use runner::{CaseReport, Results, RunState, ScriptLoader, TestCase, TestResults};
pub use suite::{check_suite, run, run_suite, AbortedCase, CheckReport, SuiteReport};
