//! Simulated browser session
//!
//! [`SiteBrowser`] implements [`Automation`] over an in-memory [`Site`]. Each
//! session owns its own location, history, element state and cookies, so
//! concurrent test cases never share mutable state.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common::{Error, Result};
use crate::interpreter::{Automation, Row, Value};
use crate::testing::ScriptLoader;

use super::locator::Locator;
use super::site::{Element, ElementKind, Page, Site};

/// A browser session over a simulated site
pub struct SiteBrowser {
    site: Arc<Site>,
    location: Option<String>,
    history: Vec<String>,
    /// Working copy of the current page's elements
    elements: Vec<Element>,
    cookies: BTreeMap<String, String>,
}

impl SiteBrowser {
    pub fn new(site: Arc<Site>) -> Self {
        Self {
            site,
            location: None,
            history: Vec::new(),
            elements: Vec::new(),
            cookies: BTreeMap::new(),
        }
    }

    /// Load a page, resetting element state
    fn load(&mut self, target: &str) -> Result<()> {
        let url = self.site.resolve_url(target);
        let page = self
            .site
            .page(&url)
            .ok_or_else(|| Error::navigation(&url, "no such page"))?;
        self.elements = page.elements.clone();

        if let Some(previous) = self.location.replace(url.clone()) {
            self.history.push(previous);
        }
        tracing::debug!(%url, "page loaded");
        Ok(())
    }

    /// Load from within a script, where a missing page is a script failure
    fn open(&mut self, command: &str, target: &str) -> Result<Value> {
        self.load(target)
            .map_err(|e| Error::command_failed(command, e.to_string()))?;
        Ok(Value::Void)
    }

    fn page(&self) -> Result<&Page> {
        self.location
            .as_deref()
            .and_then(|url| self.site.page(url))
            .ok_or_else(|| Error::command_failed("page", "no page has been loaded"))
    }

    fn find(&self, locator: &str) -> Result<usize> {
        Locator::parse(locator)?
            .find(&self.elements)
            .ok_or_else(|| Error::ElementNotFound(locator.to_string()))
    }

    fn element(&self, locator: &str) -> Result<&Element> {
        let index = self.find(locator)?;
        Ok(&self.elements[index])
    }

    fn element_mut(&mut self, locator: &str) -> Result<&mut Element> {
        let index = self.find(locator)?;
        Ok(&mut self.elements[index])
    }

    fn ids_of(&self, kind: ElementKind) -> Value {
        Value::List(
            self.elements
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.id.clone().unwrap_or_default())
                .collect(),
        )
    }

    fn click(&mut self, locator: &str) -> Result<Value> {
        let index = self.find(locator)?;
        let (kind, href) = {
            let element = &self.elements[index];
            if !element.visible {
                return Err(Error::command_failed(
                    "click",
                    format!("element {locator} is not visible"),
                ));
            }
            (element.kind, element.href.clone())
        };

        match (kind, href) {
            (ElementKind::Checkbox, _) => {
                let element = &mut self.elements[index];
                element.checked = !element.checked;
                Ok(Value::Void)
            }
            (ElementKind::Radio, _) => self.set_checked("click", locator, true),
            (ElementKind::Link | ElementKind::Button, Some(href)) => self.open("click", &href),
            _ => Ok(Value::Void),
        }
    }

    fn set_checked(&mut self, command: &str, locator: &str, checked: bool) -> Result<Value> {
        let index = self.find(locator)?;
        let element = &self.elements[index];
        if !element.kind.is_toggle() {
            return Err(Error::command_failed(command, "Element is not a toggle-button."));
        }

        // checking a radio clears the rest of its group
        if element.kind == ElementKind::Radio && checked {
            let group = element.name.clone();
            for other in self.elements.iter_mut() {
                if other.kind == ElementKind::Radio && other.name == group {
                    other.checked = false;
                }
            }
        }
        self.elements[index].checked = checked;
        Ok(Value::Void)
    }

    fn submit(&mut self, locator: &str) -> Result<Value> {
        let href = self.element(locator)?.href.clone();
        match href {
            Some(href) => self.open("submit", &href),
            None => Ok(Value::Void),
        }
    }

    fn value_of(&self, locator: &str) -> Result<Value> {
        let element = self.element(locator)?;
        let value = match element.kind {
            ElementKind::Checkbox | ElementKind::Radio => {
                (if element.checked { "on" } else { "off" }).to_string()
            }
            ElementKind::Select => selected_label(element).unwrap_or_default(),
            _ => element.value.clone(),
        };
        Ok(Value::Text(value))
    }

    fn attribute(&self, attribute_locator: &str) -> Result<Value> {
        let (locator, name) = attribute_locator.rsplit_once('@').ok_or_else(|| {
            Error::command_failed(
                "getAttribute",
                format!("'{attribute_locator}' is not of the form element@attribute"),
            )
        })?;
        self.element(locator)?
            .attribute(name)
            .map(Value::Text)
            .ok_or_else(|| {
                Error::command_failed(
                    "getAttribute",
                    format!("Could not find element attribute: {attribute_locator}"),
                )
            })
    }

    fn selected(&self, locator: &str) -> Result<Value> {
        let element = self.element(locator)?;
        if element.kind != ElementKind::Select {
            return Err(Error::command_failed(
                "getSelectedLabel",
                format!("Specified element {locator} is not a select"),
            ));
        }
        selected_label(element)
            .map(Value::Text)
            .ok_or_else(|| Error::command_failed("getSelectedLabel", "No option selected"))
    }

    fn text_present(&self, pattern: &str) -> Result<Value> {
        let page = self.page()?;
        let present = page.text.contains(pattern)
            || self.elements.iter().any(|e| e.visible && e.text.contains(pattern));
        Ok(Value::Flag(present))
    }

    fn element_present(&self, locator: &str) -> Result<Value> {
        match self.find(locator) {
            Ok(_) => Ok(Value::Flag(true)),
            Err(Error::ElementNotFound(_)) => Ok(Value::Flag(false)),
            Err(e) => Err(e),
        }
    }

    fn is_checked(&self, locator: &str) -> Result<Value> {
        let element = self.element(locator)?;
        if !element.kind.is_toggle() {
            return Err(Error::command_failed(
                "isChecked",
                "Element is not a toggle-button.",
            ));
        }
        Ok(Value::Flag(element.checked))
    }

    fn type_text(&mut self, locator: &str, text: &str) -> Result<Value> {
        let element = self.element_mut(locator)?;
        if !element.kind.is_field() || element.kind.is_toggle() {
            return Err(Error::command_failed(
                "type",
                format!("Element {locator} cannot be typed into"),
            ));
        }
        if !element.editable {
            return Err(Error::command_failed("type", "Element is read only"));
        }
        element.value = text.to_string();
        Ok(Value::Void)
    }

    fn select(&mut self, locator: &str, option_locator: &str) -> Result<Value> {
        let element = self.element_mut(locator)?;
        if element.kind != ElementKind::Select {
            return Err(Error::command_failed(
                "select",
                format!("Specified element {locator} is not a select"),
            ));
        }

        let found = match option_locator.split_once('=') {
            Some(("index", index)) => index
                .parse::<usize>()
                .ok()
                .and_then(|i| element.options.get(i).cloned()),
            Some(("label" | "value", label)) => {
                element.options.iter().find(|o| *o == label).cloned()
            }
            _ => element.options.iter().find(|o| *o == option_locator).cloned(),
        };

        let option = found.ok_or_else(|| {
            Error::command_failed("select", format!("Option '{option_locator}' not found"))
        })?;
        element.selected = Some(option);
        Ok(Value::Void)
    }

    fn go_back(&mut self) -> Result<Value> {
        let previous = self
            .history
            .pop()
            .ok_or_else(|| Error::command_failed("goBack", "no previous page"))?;
        self.load(&previous)
            .map_err(|e| Error::command_failed("goBack", e.to_string()))?;
        // loading pushed the page we came from; going back must not
        self.history.pop();
        Ok(Value::Void)
    }

    fn refresh(&mut self) -> Result<Value> {
        let page = self.page()?;
        self.elements = page.elements.clone();
        Ok(Value::Void)
    }

    fn create_cookie(&mut self, pair: &str) -> Result<Value> {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            Error::command_failed("createCookie", format!("Invalid parameter: {pair}"))
        })?;
        self.cookies.insert(name.trim().to_string(), value.trim().to_string());
        Ok(Value::Void)
    }

    fn cookie_header(&self) -> Value {
        Value::Text(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn selected_label(element: &Element) -> Option<String> {
    element
        .selected
        .clone()
        .or_else(|| element.options.first().cloned())
}

fn parse_millis(command: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::command_failed(command, format!("'{value}' is not a number of milliseconds")))
}

impl Automation for SiteBrowser {
    fn invoke(&mut self, method: &str, args: &[String]) -> Result<Value> {
        tracing::trace!(method, ?args, "invoke");

        match (method, args) {
            ("getTitle", []) => Ok(Value::Text(self.page()?.title.clone())),
            ("getLocation", []) => self
                .location
                .clone()
                .map(Value::Text)
                .ok_or_else(|| Error::command_failed(method, "no page has been loaded")),
            ("getBodyText", []) => Ok(Value::Text(self.page()?.text.clone())),
            ("getAllLinks", []) => Ok(self.ids_of(ElementKind::Link)),
            ("getAllButtons", []) => Ok(self.ids_of(ElementKind::Button)),
            ("getAllFields", []) => Ok(self.ids_of(ElementKind::Input)),
            ("getCookie", []) => Ok(self.cookie_header()),
            ("goBack", []) => self.go_back(),
            ("refresh", []) => self.refresh(),
            ("windowFocus" | "windowMaximize", []) => Ok(Value::Void),
            ("deleteAllVisibleCookies", []) => {
                self.cookies.clear();
                Ok(Value::Void)
            }

            ("open", [url]) => self.open(method, url),
            ("click", [locator]) => self.click(locator),
            ("check", [locator]) => self.set_checked(method, locator, true),
            ("uncheck", [locator]) => self.set_checked(method, locator, false),
            ("submit", [locator]) => self.submit(locator),
            ("getText", [locator]) => Ok(Value::Text(self.element(locator)?.text.clone())),
            ("getValue", [locator]) => self.value_of(locator),
            ("getAttribute", [attribute_locator]) => self.attribute(attribute_locator),
            ("getSelectedLabel", [locator]) => self.selected(locator),
            ("getCookieByName", [name]) => {
                Ok(self.cookies.get(name).cloned().map_or(Value::Void, Value::Text))
            }
            ("isTextPresent", [pattern]) => self.text_present(pattern),
            ("isElementPresent", [locator]) => self.element_present(locator),
            ("isVisible", [locator]) => Ok(Value::Flag(self.element(locator)?.visible)),
            ("isEditable", [locator]) => {
                let element = self.element(locator)?;
                Ok(Value::Flag(element.kind.is_field() && element.editable))
            }
            ("isChecked", [locator]) => self.is_checked(locator),
            ("isCookiePresent", [name]) => Ok(Value::Flag(self.cookies.contains_key(name))),
            ("waitForPageToLoad", [timeout]) => {
                self.wait_for_page_to_load(timeout)?;
                Ok(Value::Void)
            }
            // pages load instantly, so only the argument is checked
            ("setTimeout" | "setSpeed", [millis]) => {
                parse_millis(method, millis)?;
                Ok(Value::Void)
            }

            ("type", [locator, text]) => self.type_text(locator, text),
            ("select", [locator, option]) => self.select(locator, option),
            ("fireEvent", [locator, _event]) => {
                self.find(locator)?;
                Ok(Value::Void)
            }
            ("createCookie", [pair, _options]) => self.create_cookie(pair),
            ("deleteCookie", [name, _options]) => {
                self.cookies.remove(name);
                Ok(Value::Void)
            }

            _ => Err(Error::fatal_invocation(
                method,
                args,
                "not supported by the simulated browser",
            )),
        }
    }

    fn current_location(&self) -> Option<String> {
        self.location.clone()
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        self.load(url)
    }

    fn wait_for_page_to_load(&mut self, timeout: &str) -> Result<()> {
        let millis = parse_millis("waitForPageToLoad", timeout)?;
        if self.page()?.ready {
            Ok(())
        } else {
            Err(Error::command_failed(
                "waitForPageToLoad",
                format!("Timed out after {millis}ms"),
            ))
        }
    }
}

/// Serves the script table of a site page
#[derive(Clone)]
pub struct SiteScripts {
    site: Arc<Site>,
}

impl SiteScripts {
    pub fn new(site: Arc<Site>) -> Self {
        Self { site }
    }
}

impl ScriptLoader for SiteScripts {
    fn load_rows(&self, target: &str) -> Result<Vec<Row>> {
        let url = self.site.resolve_url(target);
        let page = self
            .site
            .page(&url)
            .ok_or_else(|| Error::navigation(&url, "no such page"))?;
        Ok(page
            .script
            .iter()
            .filter_map(|cells| Row::from_cells(cells.as_slice()))
            .collect())
    }
}
