//! Element locators
//!
//! Supports `id=`, `name=`, `link=` and `identifier=` strategies. A locator
//! without a known prefix is an identifier: matched by id first, then by
//! name.

use std::fmt;

use crate::common::{Error, Result};

use super::site::{Element, ElementKind};

/// Strategies real browsers understand but this one cannot evaluate
const UNSUPPORTED: [&str; 4] = ["xpath", "css", "dom", "ui"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    Name(String),
    /// Link by its visible text
    Link(String),
    /// Id, falling back to name
    Identifier(String),
}

impl Locator {
    /// Parse a locator string
    ///
    /// Unsupported strategies are a domain failure, like any other locator
    /// the browser cannot resolve.
    pub fn parse(s: &str) -> Result<Self> {
        if s.starts_with("//") {
            return Err(unsupported(s, "xpath"));
        }
        if s.starts_with("document.") {
            return Err(unsupported(s, "dom"));
        }

        if let Some((strategy, rest)) = s.split_once('=') {
            match strategy {
                "id" => return Ok(Locator::Id(rest.to_string())),
                "name" => return Ok(Locator::Name(rest.to_string())),
                "link" => return Ok(Locator::Link(rest.to_string())),
                "identifier" => return Ok(Locator::Identifier(rest.to_string())),
                other if UNSUPPORTED.contains(&other) => return Err(unsupported(s, other)),
                _ => {}
            }
        }

        Ok(Locator::Identifier(s.to_string()))
    }

    /// Find the index of the first matching element
    pub fn find(&self, elements: &[Element]) -> Option<usize> {
        let by_id = |id: &str| elements.iter().position(|e| e.id.as_deref() == Some(id));
        let by_name = |name: &str| elements.iter().position(|e| e.name.as_deref() == Some(name));

        match self {
            Locator::Id(id) => by_id(id),
            Locator::Name(name) => by_name(name),
            Locator::Link(text) => elements
                .iter()
                .position(|e| e.kind == ElementKind::Link && e.text == *text),
            Locator::Identifier(ident) => by_id(ident).or_else(|| by_name(ident)),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={v}"),
            Locator::Name(v) => write!(f, "name={v}"),
            Locator::Link(v) => write!(f, "link={v}"),
            Locator::Identifier(v) => write!(f, "{v}"),
        }
    }
}

fn unsupported(locator: &str, strategy: &str) -> Error {
    Error::command_failed(
        "locate",
        format!("unsupported locator strategy '{strategy}' in '{locator}'"),
    )
}
