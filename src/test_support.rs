//! Fakes shared by unit tests

use std::collections::HashMap;

use crate::common::{Error, Result};
use crate::interpreter::{Automation, Row, Value};
use crate::testing::ScriptLoader;

type FailureFn = Box<dyn Fn() -> Error + Send>;

/// Automation handle that records every call it receives
#[derive(Default)]
pub struct RecordingHandle {
    pub calls: Vec<String>,
    pub navigations: Vec<String>,
    pub location: Option<String>,
    returns: HashMap<String, Value>,
    failures: HashMap<String, FailureFn>,
}

impl RecordingHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn returning(mut self, method: &str, value: Value) -> Self {
        self.returns.insert(method.to_string(), value);
        self
    }

    pub fn failing(mut self, method: &str, error: impl Fn() -> Error + Send + 'static) -> Self {
        self.failures.insert(method.to_string(), Box::new(error));
        self
    }

    fn record(&mut self, method: &str, args: &[String]) -> Result<()> {
        self.calls.push(format!("{method}({})", args.join(",")));
        match self.failures.get(method) {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

impl Automation for RecordingHandle {
    fn invoke(&mut self, method: &str, args: &[String]) -> Result<Value> {
        self.record(method, args)?;
        Ok(self.returns.get(method).cloned().unwrap_or(Value::Void))
    }

    fn current_location(&self) -> Option<String> {
        self.location.clone()
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        if let Some(failure) = self.failures.get("navigate") {
            return Err(failure());
        }
        self.navigations.push(url.to_string());
        self.location = Some(url.to_string());
        Ok(())
    }

    fn wait_for_page_to_load(&mut self, timeout: &str) -> Result<()> {
        self.record("waitForPageToLoad", &[timeout.to_string()])
    }
}

/// Script loader serving a fixed list of rows for any target
pub struct StaticLoader {
    rows: Vec<Row>,
    failure: Option<FailureFn>,
}

impl StaticLoader {
    pub fn new(rows: &[[&str; 3]]) -> Self {
        Self {
            rows: rows.iter().map(|[c, t, v]| Row::new(c, t, v)).collect(),
            failure: None,
        }
    }

    /// A loader whose every load fails
    pub fn failing(error: impl Fn() -> Error + Send + 'static) -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(Box::new(error)),
        }
    }
}

impl ScriptLoader for StaticLoader {
    fn load_rows(&self, _target: &str) -> Result<Vec<Row>> {
        match &self.failure {
            Some(failure) => Err(failure()),
            None => Ok(self.rows.clone()),
        }
    }
}
