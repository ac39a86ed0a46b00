//! Simulated browser
//!
//! An in-memory stand-in for a browser session: the capability set it
//! declares, the process-wide command catalog built from that set, and the
//! [`SiteBrowser`] handle that executes commands against a [`Site`].

mod locator;
mod session;
mod site;

pub use locator::Locator;
pub use session::{SiteBrowser, SiteScripts};
pub use site::{Element, ElementKind, Page, Site};

use crate::common::config::CatalogSettings;
use crate::common::Result;
use crate::interpreter::{CapabilitySet, CatalogCell, CommandCatalog};

/// Capabilities of the simulated browser as `(name, arity)`
///
/// The lifecycle and server-side entries at the end are declared but never
/// dispatched; the default reserved list hides them from scripts.
const CAPABILITIES: &[(&str, usize)] = &[
    // accessors
    ("getTitle", 0),
    ("getLocation", 0),
    ("getBodyText", 0),
    ("getAllLinks", 0),
    ("getAllButtons", 0),
    ("getAllFields", 0),
    ("getCookie", 0),
    ("getText", 1),
    ("getValue", 1),
    ("getAttribute", 1),
    ("getSelectedLabel", 1),
    ("getCookieByName", 1),
    ("isTextPresent", 1),
    ("isElementPresent", 1),
    ("isVisible", 1),
    ("isEditable", 1),
    ("isChecked", 1),
    ("isCookiePresent", 1),
    // actions
    ("goBack", 0),
    ("refresh", 0),
    ("windowFocus", 0),
    ("windowMaximize", 0),
    ("deleteAllVisibleCookies", 0),
    ("open", 1),
    ("click", 1),
    ("check", 1),
    ("uncheck", 1),
    ("submit", 1),
    ("waitForPageToLoad", 1),
    ("setTimeout", 1),
    ("setSpeed", 1),
    ("type", 2),
    ("select", 2),
    ("fireEvent", 2),
    ("createCookie", 2),
    ("deleteCookie", 2),
    // lifecycle and server-side
    ("start", 0),
    ("stop", 0),
    ("pause", 1),
    ("setExtensionJs", 1),
    ("allowNativeXpath", 1),
    ("setBrowserLogLevel", 1),
    ("addCustomRequestHeader", 2),
    ("rollup", 2),
];

static CATALOG: CatalogCell = CatalogCell::new();

/// The capability set of the simulated browser
pub fn capabilities() -> CapabilitySet {
    CapabilitySet::from_table(CAPABILITIES)
}

/// The process-wide catalog for the simulated browser
///
/// Built on first call with that call's settings; later calls share it.
pub fn catalog(settings: &CatalogSettings) -> Result<&'static CommandCatalog> {
    CATALOG.get_or_build(capabilities, settings)
}
