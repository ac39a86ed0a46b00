//! Script rows and executable steps

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

use super::capability::{Automation, Value};

/// One script instruction: `{command, target, value}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub command: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub value: String,
}

impl Row {
    pub fn new(command: &str, target: &str, value: &str) -> Self {
        Self {
            command: command.to_string(),
            target: target.to_string(),
            value: value.to_string(),
        }
    }

    /// Build a row from table cells
    ///
    /// Rows with fewer than three cells are not instructions (headers,
    /// comments) and yield `None`. Extra cells are ignored.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Option<Self> {
        match cells {
            [command, target, value, ..] => Some(Self::new(
                command.as_ref().trim(),
                target.as_ref(),
                value.as_ref(),
            )),
            _ => None,
        }
    }
}

/// Rows not yet resolved, offered to factories of compound commands
pub type RemainingRows<'a> = &'a mut dyn Iterator<Item = Row>;

/// Whether a comparison expects the values to agree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Equal,
    NotEqual,
}

/// What a step does around its invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Invoke and hand back the result
    Invoke,
    /// Invoke and compare the result against an expected value
    Compare {
        expected: String,
        expectation: Expectation,
    },
    /// Invoke, then wait for the page with a fixed timeout
    InvokeAndWait { timeout: String },
}

/// An executable unit bound to one capability method and fixed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub command: String,
    pub method: String,
    pub args: Vec<String>,
    pub action: StepAction,
}

impl Step {
    /// Run the step against a handle
    ///
    /// Domain failures come back as errors for which
    /// [`Error::is_domain_failure`] holds; any other error is fatal.
    pub fn execute(&self, handle: &mut dyn Automation) -> Result<Value> {
        match &self.action {
            StepAction::Invoke => self.invoke(handle),
            StepAction::Compare {
                expected,
                expectation,
            } => {
                let seen = self.invoke(handle)?;
                compare(&seen, expected, *expectation)?;
                Ok(seen)
            }
            StepAction::InvokeAndWait { timeout } => {
                let result = self.invoke(handle);
                if let Err(e) = &result {
                    if !e.is_domain_failure() {
                        return result;
                    }
                }
                tracing::trace!(command = %self.command, %timeout, "waiting for page to load");
                handle
                    .wait_for_page_to_load(timeout)
                    .map_err(|e| self.classify("waitForPageToLoad", std::slice::from_ref(timeout), e))?;
                result
            }
        }
    }

    fn invoke(&self, handle: &mut dyn Automation) -> Result<Value> {
        handle
            .invoke(&self.method, &self.args)
            .map_err(|e| self.classify(&self.method, &self.args, e))
    }

    /// Keep domain failures as they are, wrap everything else as fatal
    fn classify(&self, method: &str, args: &[String], error: Error) -> Error {
        if error.is_domain_failure() || matches!(error, Error::FatalInvocation { .. }) {
            error
        } else {
            Error::fatal_invocation(method, args, error.to_string())
        }
    }
}

fn compare(seen: &Value, expected: &str, expectation: Expectation) -> Result<()> {
    match expectation {
        Expectation::Equal if !seen.matches(expected) => Err(Error::AssertionFailed(format!(
            "Expected \"{expected}\" but saw \"{seen}\" instead"
        ))),
        Expectation::NotEqual if seen.matches(expected) => Err(Error::AssertionFailed(format!(
            "Did not expect \"{expected}\" but saw it"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingHandle;

    fn step(method: &str, args: &[&str], action: StepAction) -> Step {
        Step {
            command: method.to_string(),
            method: method.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            action,
        }
    }

    #[test]
    fn test_row_from_cells() {
        let row = Row::from_cells(&["click", "id=a", "", "extra"]).unwrap();
        assert_eq!(row, Row::new("click", "id=a", ""));
        assert!(Row::from_cells(&["Test title"]).is_none());
        assert!(Row::from_cells(&["open", "/"]).is_none());
    }

    #[test]
    fn test_invoke_passes_arguments() {
        let mut handle = RecordingHandle::new();
        let s = step("type", &["id=q", "rust"], StepAction::Invoke);
        s.execute(&mut handle).unwrap();
        assert_eq!(handle.calls, vec!["type(id=q,rust)"]);
    }

    #[test]
    fn test_compare_equal() {
        let mut handle = RecordingHandle::new().returning("getTitle", Value::from("Home"));
        let pass = step(
            "getTitle",
            &[],
            StepAction::Compare {
                expected: "Home".into(),
                expectation: Expectation::Equal,
            },
        );
        assert_eq!(pass.execute(&mut handle).unwrap(), Value::from("Home"));

        let fail = step(
            "getTitle",
            &[],
            StepAction::Compare {
                expected: "Away".into(),
                expectation: Expectation::Equal,
            },
        );
        let err = fail.execute(&mut handle).unwrap_err();
        assert!(matches!(err, Error::AssertionFailed(_)));
        assert!(err.to_string().contains("Expected \"Away\" but saw \"Home\""));
    }

    #[test]
    fn test_compare_not_equal() {
        let mut handle = RecordingHandle::new().returning("isChecked", Value::Flag(false));
        let s = step(
            "isChecked",
            &["id=box"],
            StepAction::Compare {
                expected: "true".into(),
                expectation: Expectation::NotEqual,
            },
        );
        assert!(s.execute(&mut handle).is_ok());

        let s = step(
            "isChecked",
            &["id=box"],
            StepAction::Compare {
                expected: "false".into(),
                expectation: Expectation::NotEqual,
            },
        );
        assert!(s.execute(&mut handle).unwrap_err().is_domain_failure());
    }

    #[test]
    fn test_and_wait_waits_after_invoking() {
        let mut handle = RecordingHandle::new();
        let s = step(
            "click",
            &["id=go"],
            StepAction::InvokeAndWait {
                timeout: "30000".into(),
            },
        );
        s.execute(&mut handle).unwrap();
        assert_eq!(handle.calls, vec!["click(id=go)", "waitForPageToLoad(30000)"]);
    }

    #[test]
    fn test_and_wait_still_waits_after_domain_failure() {
        let mut handle = RecordingHandle::new()
            .failing("click", || Error::ElementNotFound("id=missing".into()));
        let s = step(
            "click",
            &["id=missing"],
            StepAction::InvokeAndWait {
                timeout: "100".into(),
            },
        );
        let err = s.execute(&mut handle).unwrap_err();
        assert!(matches!(err, Error::ElementNotFound(_)));
        assert_eq!(handle.calls, vec!["click(id=missing)", "waitForPageToLoad(100)"]);
    }

    #[test]
    fn test_and_wait_skips_wait_after_fatal_error() {
        let mut handle =
            RecordingHandle::new().failing("click", || Error::Internal("handle crashed".into()));
        let s = step(
            "click",
            &["id=go"],
            StepAction::InvokeAndWait {
                timeout: "100".into(),
            },
        );
        let err = s.execute(&mut handle).unwrap_err();
        assert!(matches!(err, Error::FatalInvocation { .. }));
        assert_eq!(handle.calls, vec!["click(id=go)"]);
    }

    #[test]
    fn test_non_domain_errors_become_fatal() {
        let mut handle =
            RecordingHandle::new().failing("getTitle", || Error::Internal("socket closed".into()));
        let s = step("getTitle", &[], StepAction::Invoke);
        match s.execute(&mut handle).unwrap_err() {
            Error::FatalInvocation { method, reason, .. } => {
                assert_eq!(method, "getTitle");
                assert!(reason.contains("socket closed"));
            }
            other => panic!("Expected FatalInvocation, got {other:?}"),
        }
    }
}
