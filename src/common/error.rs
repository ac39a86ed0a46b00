//! Error types for the Selenese runner
//!
//! Errors fall into two families. Domain failures (assertion mismatches,
//! missing elements, impossible commands) are expected at script level and
//! are recorded as test failures. Everything else is fatal and propagates to
//! whoever started the run.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Selenese runner
#[derive(Error, Debug)]
pub enum Error {
    // === Script Errors ===
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    // === Domain Failures ===
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Element {0} not found")]
    ElementNotFound(String),

    #[error("{command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    // === Fatal Errors ===
    #[error("Unable to emulate {method} {args:?}: {reason}")]
    FatalInvocation {
        method: String,
        args: Vec<String>,
        reason: String,
    },

    #[error("Failed to navigate to '{url}': {reason}")]
    Navigation { url: String, reason: String },

    // === Catalog Errors ===
    #[error("Command catalog is inconsistent: '{name}' would be registered twice")]
    CatalogConsistency { name: String },

    // === Configuration Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid test suite: {0}")]
    SuiteParse(String),

    #[error("{failed} test case(s) failed, {aborted} aborted, {skipped} not started")]
    SuiteFailed {
        failed: usize,
        aborted: usize,
        skipped: usize,
    },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is a script-level failure that gets recorded
    /// rather than propagated
    pub fn is_domain_failure(&self) -> bool {
        matches!(
            self,
            Error::AssertionFailed(_) | Error::ElementNotFound(_) | Error::CommandFailed { .. }
        )
    }

    /// Create a command failed error
    pub fn command_failed(command: &str, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a fatal invocation error
    pub fn fatal_invocation(method: &str, args: &[String], reason: impl Into<String>) -> Self {
        Self::FatalInvocation {
            method: method.to_string(),
            args: args.to_vec(),
            reason: reason.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(url: &str, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable code, used in JSON reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownCommand(_) => "UNKNOWN_COMMAND",
            Error::AssertionFailed(_) => "ASSERTION_FAILED",
            Error::ElementNotFound(_) => "ELEMENT_NOT_FOUND",
            Error::CommandFailed { .. } => "COMMAND_FAILED",
            Error::FatalInvocation { .. } => "FATAL_INVOCATION",
            Error::Navigation { .. } => "NAVIGATION_FAILED",
            Error::CatalogConsistency { .. } => "CATALOG_CONSISTENCY",
            Error::ConfigParse(_) => "CONFIG",
            Error::SuiteParse(_) => "SUITE_PARSE",
            Error::SuiteFailed { .. } => "SUITE_FAILED",
            _ => "INTERNAL_ERROR",
        }
    }
}
