//! Site model for the simulated browser
//!
//! A site is a set of pages, each with a title, body text, elements and an
//! optional script table. Suites describe sites in YAML.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A collection of pages addressed by URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Site {
    /// Prefix joined onto targets starting with `/`
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Site {
    /// Resolve a script target to an absolute URL
    pub fn resolve_url(&self, target: &str) -> String {
        match &self.base_url {
            Some(base) if target.starts_with('/') => {
                format!("{}{}", base.trim_end_matches('/'), target)
            }
            _ => target.to_string(),
        }
    }

    pub fn page(&self, url: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.url == url)
    }
}

/// One page of the site
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub url: String,

    #[serde(default)]
    pub title: String,

    /// Visible body text
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub elements: Vec<Element>,

    /// Script table rows (`[command, target, value]`)
    #[serde(default)]
    pub script: Vec<Vec<String>>,

    /// Whether the page ever finishes loading
    #[serde(default = "default_true")]
    pub ready: bool,
}

/// Kind of a page element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Static text (headings, paragraphs, spans)
    #[default]
    Label,
    Input,
    Checkbox,
    Radio,
    Select,
    Link,
    Button,
}

impl ElementKind {
    pub fn is_toggle(self) -> bool {
        matches!(self, ElementKind::Checkbox | ElementKind::Radio)
    }

    pub fn is_field(self) -> bool {
        matches!(
            self,
            ElementKind::Input | ElementKind::Checkbox | ElementKind::Radio | ElementKind::Select
        )
    }
}

/// An element on a page
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub kind: ElementKind,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub checked: bool,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default = "default_true")]
    pub editable: bool,

    /// Option labels of a select
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub selected: Option<String>,

    /// Page a link, button or form submission leads to
    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    /// Look up an attribute, falling back to the element's own fields
    pub fn attribute(&self, name: &str) -> Option<String> {
        if let Some(value) = self.attributes.get(name) {
            return Some(value.clone());
        }
        match name {
            "id" => self.id.clone(),
            "name" => self.name.clone(),
            "href" => self.href.clone(),
            "value" => Some(self.value.clone()),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}
