//! Test suite configuration types
//!
//! Defines the data structures for deserializing YAML test suites. A suite
//! describes a simulated site and the pages whose script tables are the
//! test cases.

use serde::Deserialize;
use std::path::Path;

use crate::browser::Site;
use crate::common::{Error, Result};

/// A complete test suite loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// The site the test cases run against
    #[serde(default)]
    pub site: Site,
    /// Test cases, in the order they are scheduled
    #[serde(default)]
    pub tests: Vec<TestCaseConfig>,
}

/// One test case: a page holding a script table
#[derive(Deserialize, Debug, Clone)]
pub struct TestCaseConfig {
    /// Display name (defaults to the URL)
    pub name: Option<String>,
    /// Page holding the script
    pub url: String,
}

impl TestSuite {
    /// Load and parse a suite file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::SuiteParse(e.to_string()))
    }
}
