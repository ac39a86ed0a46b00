//! Test case runner
//!
//! Runs one test case: navigate to its page if needed, load the script rows,
//! resolve all of them, then execute the steps in order. A domain failure
//! ends the case with one recorded failure; any other error aborts the run
//! and propagates.

use serde::Serialize;
use std::fmt;

use crate::common::Result;
use crate::interpreter::{Automation, CommandCatalog, Row};

/// Source of script rows for a target page
pub trait ScriptLoader {
    /// Rows in document order; an empty script is valid
    fn load_rows(&self, target: &str) -> Result<Vec<Row>>;
}

/// Sink for test outcomes
pub trait Results {
    fn record_success(&mut self);
    fn record_failure(&mut self, reason: &str);
}

/// Success and failure counts across one or more test cases
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TestResults {
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<String>,
}

impl TestResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Fold another set of results into this one
    pub fn merge(&mut self, other: TestResults) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }
}

impl Results for TestResults {
    fn record_success(&mut self) {
        self.passed += 1;
    }

    fn record_failure(&mut self, reason: &str) {
        self.failed += 1;
        self.failures.push(reason.to_string());
    }
}

/// Where a test case run is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Navigated,
    Resolving,
    Executing,
    Completed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::NotStarted => "not started",
            RunState::Navigated => "navigated",
            RunState::Resolving => "resolving",
            RunState::Executing => "executing",
            RunState::Completed => "completed",
            RunState::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// Result of running a test case to completion
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub url: String,
    pub state: RunState,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub failure: Option<String>,
}

/// A script page to run
#[derive(Debug, Clone)]
pub struct TestCase {
    name: String,
    url: String,
}

impl TestCase {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the test case, recording its outcome in `results`
    ///
    /// Returns `Err` for unknown commands and fatal errors; nothing is
    /// recorded in that case.
    pub fn run(
        &self,
        catalog: &CommandCatalog,
        loader: &dyn ScriptLoader,
        handle: &mut dyn Automation,
        results: &mut dyn Results,
    ) -> Result<CaseReport> {
        let mut state = RunState::NotStarted;
        let outcome = self.drive(&mut state, catalog, loader, handle, results);
        if let Err(e) = &outcome {
            self.transition(&mut state, RunState::Aborted);
            tracing::warn!(case = %self.name, error = %e, "test case aborted");
        }
        outcome
    }

    fn drive(
        &self,
        state: &mut RunState,
        catalog: &CommandCatalog,
        loader: &dyn ScriptLoader,
        handle: &mut dyn Automation,
        results: &mut dyn Results,
    ) -> Result<CaseReport> {
        if handle.current_location().as_deref() != Some(self.url.as_str()) {
            tracing::debug!(case = %self.name, url = %self.url, "navigating");
            handle.navigate(&self.url)?;
        }
        self.transition(state, RunState::Navigated);

        self.transition(state, RunState::Resolving);
        let rows = loader.load_rows(&self.url)?;
        let steps = catalog.resolve(rows)?;
        let steps_total = steps.len();

        self.transition(state, RunState::Executing);
        for (i, step) in steps.iter().enumerate() {
            let step_num = i + 1;
            tracing::debug!(
                case = %self.name,
                step = step_num,
                command = %step.command,
                args = ?step.args,
                "executing step"
            );

            match step.execute(handle) {
                Ok(value) => {
                    tracing::trace!(case = %self.name, step = step_num, result = %value, "step passed");
                }
                Err(e) if e.is_domain_failure() => {
                    let reason = format!("Step {} ({}): {}", step_num, step.command, e);
                    tracing::info!(case = %self.name, %reason, "test case failed");
                    results.record_failure(&reason);
                    self.transition(state, RunState::Completed);
                    return Ok(self.report(*state, false, step_num, steps_total, Some(reason)));
                }
                Err(e) => return Err(e),
            }
        }

        results.record_success();
        self.transition(state, RunState::Completed);
        Ok(self.report(*state, true, steps_total, steps_total, None))
    }

    fn transition(&self, state: &mut RunState, next: RunState) {
        tracing::trace!(case = %self.name, from = %state, to = %next, "state transition");
        *state = next;
    }

    fn report(
        &self,
        state: RunState,
        passed: bool,
        steps_run: usize,
        steps_total: usize,
        failure: Option<String>,
    ) -> CaseReport {
        CaseReport {
            name: self.name.clone(),
            url: self.url.clone(),
            state,
            passed,
            steps_run,
            steps_total,
            failure,
        }
    }
}
