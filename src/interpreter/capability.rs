//! Capability descriptors and the automation handle seam
//!
//! A capability set is a declarative list of `{name, arity}` pairs. The
//! handle that executes them is reached through [`Automation::invoke`],
//! which dispatches on the method name.

use serde::Serialize;
use std::fmt;

use crate::common::Result;

/// Largest arity a capability may have and still become a command
pub const MAX_ARITY: usize = 2;

/// One primitive operation exposed by an automation handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityMethod {
    pub name: String,
    pub arity: usize,
}

impl CapabilityMethod {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Bind a row's target and value to this method's positional arguments
    ///
    /// Index 0 is the target/locator, index 1 the value. Arity-0 methods get
    /// no arguments whatever the row carries.
    pub fn bind_args(&self, target: &str, value: &str) -> Vec<String> {
        [target, value]
            .into_iter()
            .take(self.arity)
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for CapabilityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Ordered list of the capabilities a handle supports
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    methods: Vec<CapabilityMethod>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a static `(name, arity)` table
    pub fn from_table(table: &[(&str, usize)]) -> Self {
        table
            .iter()
            .map(|(name, arity)| CapabilityMethod::new(*name, *arity))
            .collect()
    }

    pub fn push(&mut self, method: CapabilityMethod) {
        self.methods.push(method);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityMethod> {
        self.methods.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CapabilityMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl FromIterator<CapabilityMethod> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = CapabilityMethod>>(iter: I) -> Self {
        Self {
            methods: iter.into_iter().collect(),
        }
    }
}

/// What an invocation produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Actions return nothing
    Void,
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl Value {
    /// Canonical text form used for comparisons, `None` for `Void`
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Void => None,
            Value::Text(s) => Some(s.clone()),
            Value::Flag(b) => Some(b.to_string()),
            Value::List(items) => Some(items.join(",")),
        }
    }

    /// Whether this value equals an expected value taken from a script row
    pub fn matches(&self, expected: &str) -> bool {
        self.as_text().is_some_and(|seen| seen == expected)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "(nothing)"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

/// A stateful automation handle (a browser session or a stand-in for one)
///
/// Errors from `invoke` that are not domain failures (see
/// [`crate::Error::is_domain_failure`]) are treated as fatal by the
/// interpreter.
pub trait Automation {
    /// Invoke a capability by name with positional string arguments
    fn invoke(&mut self, method: &str, args: &[String]) -> Result<Value>;

    /// Where the handle currently is, `None` before the first navigation
    fn current_location(&self) -> Option<String>;

    /// Navigate to a target location
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until the current page reports ready, within `timeout` (ms)
    fn wait_for_page_to_load(&mut self, timeout: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_args_by_arity() {
        let zero = CapabilityMethod::new("getTitle", 0);
        let one = CapabilityMethod::new("click", 1);
        let two = CapabilityMethod::new("type", 2);

        assert!(zero.bind_args("ignored", "also ignored").is_empty());
        assert_eq!(one.bind_args("id=a", "ignored"), vec!["id=a"]);
        assert_eq!(two.bind_args("id=q", "rust"), vec!["id=q", "rust"]);
    }

    #[test]
    fn test_value_matching() {
        assert!(Value::from("Home").matches("Home"));
        assert!(!Value::from("Home").matches("home"));
        assert!(Value::Flag(true).matches("true"));
        assert!(!Value::Flag(false).matches("true"));
        assert!(Value::List(vec!["a".into(), "b".into()]).matches("a,b"));
        assert!(!Value::Void.matches(""));
    }

    #[test]
    fn test_capability_set_from_table() {
        let set = CapabilitySet::from_table(&[("getTitle", 0), ("click", 1)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("click").map(|m| m.arity), Some(1));
        assert!(set.get("open").is_none());
    }
}
