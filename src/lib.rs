//! Selenese runner - table-driven browser tests
//!
//! Scripts are tables of `(command, target, value)` rows. The command
//! vocabulary is derived from a browser capability set: every method is a
//! command, every accessor also yields assert/verify checks, and every
//! method has an `AndWait` variant.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod interpreter;
pub mod testing;

#[cfg(test)]
mod test_support;

pub use common::{Error, Result};
