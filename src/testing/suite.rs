//! Suite execution
//!
//! Test cases run concurrently, each on a blocking task with its own browser
//! session. They share only the site description and the command catalog.

use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::browser::{self, SiteBrowser, SiteScripts};
use crate::common::config::Config;
use crate::common::{Error, Result};

use super::config::TestSuite;
use super::runner::{CaseReport, ScriptLoader, TestCase, TestResults};

/// A test case that ended with a fatal error
#[derive(Debug, Clone, Serialize)]
pub struct AbortedCase {
    pub name: String,
    pub url: String,
    pub code: &'static str,
    pub error: String,
}

/// Outcome of a whole suite
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub results: TestResults,
    pub cases: Vec<CaseReport>,
    pub aborted: Vec<AbortedCase>,
    /// Cases never started because an earlier one aborted
    pub skipped: usize,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.results.is_success() && self.aborted.is_empty() && self.skipped == 0
    }
}

/// Script resolution outcome for one test case
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub url: String,
    pub steps: usize,
    pub error: Option<String>,
}

enum CaseOutcome {
    Finished(CaseReport),
    Aborted(AbortedCase),
}

fn test_cases(suite: &TestSuite) -> Vec<TestCase> {
    suite
        .tests
        .iter()
        .map(|t| {
            let case = TestCase::new(suite.site.resolve_url(&t.url));
            match &t.name {
                Some(name) => case.with_name(name.clone()),
                None => case,
            }
        })
        .collect()
}

/// Run a suite file
pub async fn run_suite(path: &Path, config: &Config) -> Result<SuiteReport> {
    let suite = TestSuite::load(path)?;
    run(suite, config).await
}

/// Run an already loaded suite
pub async fn run(suite: TestSuite, config: &Config) -> Result<SuiteReport> {
    let catalog = browser::catalog(&config.catalog)?;
    let cases = test_cases(&suite);
    let total = cases.len();
    let site = Arc::new(suite.site);
    let scripts = SiteScripts::new(site.clone());

    tracing::info!(
        suite = %suite.name,
        cases = total,
        parallelism = config.runner.parallelism,
        "running suite"
    );

    let permits = Arc::new(Semaphore::new(config.runner.parallelism.max(1)));
    let stop = Arc::new(AtomicBool::new(false));
    let fail_fast = config.runner.fail_fast;
    let mut tasks = JoinSet::new();

    for (index, case) in cases.into_iter().enumerate() {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Internal(format!("scheduler closed: {e}")))?;
        if stop.load(Ordering::SeqCst) {
            tracing::warn!("fail-fast: not starting remaining test cases");
            break;
        }

        let site = site.clone();
        let scripts = scripts.clone();
        let stop = stop.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let mut session = SiteBrowser::new(site);
            let mut results = TestResults::new();

            let outcome = match case.run(catalog, &scripts, &mut session, &mut results) {
                Ok(report) => CaseOutcome::Finished(report),
                Err(e) => {
                    if fail_fast {
                        stop.store(true, Ordering::SeqCst);
                    }
                    CaseOutcome::Aborted(AbortedCase {
                        name: case.name().to_string(),
                        url: case.url().to_string(),
                        code: e.code(),
                        error: e.to_string(),
                    })
                }
            };
            (index, outcome, results)
        });
    }

    let mut finished = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let entry =
            joined.map_err(|e| Error::Internal(format!("test case task failed: {e}")))?;
        finished.push(entry);
    }
    finished.sort_by_key(|(index, _, _)| *index);

    let mut report = SuiteReport {
        name: suite.name,
        results: TestResults::new(),
        cases: Vec::new(),
        aborted: Vec::new(),
        skipped: total - finished.len(),
    };
    for (_, outcome, results) in finished {
        report.results.merge(results);
        match outcome {
            CaseOutcome::Finished(case) => report.cases.push(case),
            CaseOutcome::Aborted(aborted) => report.aborted.push(aborted),
        }
    }

    tracing::info!(
        passed = report.results.passed,
        failed = report.results.failed,
        aborted = report.aborted.len(),
        skipped = report.skipped,
        "suite finished"
    );
    Ok(report)
}

/// Resolve every test case's script without executing anything
pub fn check_suite(path: &Path, config: &Config) -> Result<Vec<CheckReport>> {
    let suite = TestSuite::load(path)?;
    let catalog = browser::catalog(&config.catalog)?;
    let scripts = SiteScripts::new(Arc::new(suite.site.clone()));

    Ok(test_cases(&suite)
        .into_iter()
        .map(|case| {
            let resolved = scripts
                .load_rows(case.url())
                .and_then(|rows| catalog.resolve(rows));
            let (steps, error) = match resolved {
                Ok(steps) => (steps.len(), None),
                Err(e) => (0, Some(e.to_string())),
            };
            CheckReport {
                name: case.name().to_string(),
                url: case.url().to_string(),
                steps,
                error,
            }
        })
        .collect())
}
