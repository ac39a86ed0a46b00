//! Command-table interpreter
//!
//! Turns a capability set into a catalog of script commands and resolves
//! script rows into executable steps.

pub mod capability;
pub mod catalog;
pub mod naming;
pub mod step;

pub use capability::{Automation, CapabilityMethod, CapabilitySet, Value, MAX_ARITY};
pub use catalog::{CatalogCell, CommandCatalog, CommandFactory, CommandKind};
pub use step::{Expectation, RemainingRows, Row, Step, StepAction};
