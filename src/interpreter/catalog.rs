//! Command catalog
//!
//! Expands a capability set into every command a script may use. For each
//! usable method `m` the catalog holds `m` itself and `mAndWait`; accessor
//! methods of arity 0 or 1 additionally get the assert/verify family built
//! by [`super::naming`]. The catalog is built in one pass and never mutated
//! afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use crate::common::config::CatalogSettings;
use crate::common::{Error, Result};

use super::capability::{CapabilityMethod, CapabilitySet, MAX_ARITY};
use super::naming;
use super::step::{Expectation, RemainingRows, Row, Step, StepAction};

/// Row field holding the value an assertion expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedField {
    Target,
    Value,
}

impl ExpectedField {
    /// Accessors with no argument take the expectation from the target
    /// column, single-argument accessors from the value column. Wider
    /// methods cannot be asserted on.
    fn for_arity(arity: usize) -> Option<Self> {
        match arity {
            0 => Some(Self::Target),
            1 => Some(Self::Value),
            _ => None,
        }
    }

    fn pick<'a>(self, target: &'a str, value: &'a str) -> &'a str {
        match self {
            Self::Target => target,
            Self::Value => value,
        }
    }
}

/// Family a catalog entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Action,
    Assert,
    Verify,
    AndWait,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Action => write!(f, "action"),
            CommandKind::Assert => write!(f, "assert"),
            CommandKind::Verify => write!(f, "verify"),
            CommandKind::AndWait => write!(f, "and-wait"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandForm {
    Direct,
    Check {
        field: ExpectedField,
        expectation: Expectation,
    },
    AndWait {
        timeout: String,
    },
}

/// Builds the [`Step`] for one catalog entry
///
/// Factories hold no mutable state: the same row always produces an equal
/// step.
#[derive(Debug, Clone)]
pub struct CommandFactory {
    command: String,
    kind: CommandKind,
    method: CapabilityMethod,
    form: CommandForm,
}

impl CommandFactory {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Capability method the produced steps invoke
    pub fn method(&self) -> &CapabilityMethod {
        &self.method
    }

    /// Create the step for one row
    ///
    /// `remaining` gives access to the rows after this one; none of the
    /// generated commands consume from it.
    pub fn create(&self, _remaining: RemainingRows<'_>, target: &str, value: &str) -> Step {
        let action = match &self.form {
            CommandForm::Direct => StepAction::Invoke,
            CommandForm::Check { field, expectation } => StepAction::Compare {
                expected: field.pick(target, value).to_string(),
                expectation: *expectation,
            },
            CommandForm::AndWait { timeout } => StepAction::InvokeAndWait {
                timeout: timeout.clone(),
            },
        };

        Step {
            command: self.command.clone(),
            method: self.method.name.clone(),
            args: self.method.bind_args(target, value),
            action,
        }
    }
}

/// Immutable mapping from command name to [`CommandFactory`]
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    factories: BTreeMap<String, CommandFactory>,
}

impl CommandCatalog {
    /// Build the catalog for a capability set
    ///
    /// Fails with [`Error::CatalogConsistency`] if two entries would share a
    /// name or a derived name is reserved.
    pub fn build(capabilities: &CapabilitySet, settings: &CatalogSettings) -> Result<Self> {
        Self::assemble(capabilities, settings).map_err(|name| Error::CatalogConsistency { name })
    }

    /// Build, reporting the first colliding name on failure
    fn assemble(
        capabilities: &CapabilitySet,
        settings: &CatalogSettings,
    ) -> std::result::Result<Self, String> {
        let reserved: HashSet<&str> = settings.reserved.iter().map(String::as_str).collect();
        let mut seen = reserved.clone();
        let mut builder = Builder {
            reserved: &reserved,
            factories: BTreeMap::new(),
        };
        let timeout = settings.and_wait_timeout();

        for method in capabilities.iter() {
            if !seen.insert(method.name.as_str()) {
                tracing::trace!(method = %method.name, "skipping reserved or repeated capability");
                continue;
            }

            if method.arity > MAX_ARITY {
                tracing::debug!(method = %method, "skipping capability with too many arguments");
                continue;
            }

            builder.add(method, method.name.clone(), CommandKind::Action, CommandForm::Direct)?;

            if let (Some(short), Some(field)) = (
                naming::short_name(&method.name),
                ExpectedField::for_arity(method.arity),
            ) {
                let negated = naming::negate(short);
                let checks = [
                    (naming::assert_name(short), CommandKind::Assert, Expectation::Equal),
                    (naming::assert_name(&negated), CommandKind::Assert, Expectation::NotEqual),
                    (naming::verify_name(short), CommandKind::Verify, Expectation::Equal),
                    (naming::verify_name(&negated), CommandKind::Verify, Expectation::NotEqual),
                ];
                for (command, kind, expectation) in checks {
                    builder.add(method, command, kind, CommandForm::Check { field, expectation })?;
                }
            }

            builder.add(
                method,
                naming::and_wait_name(&method.name),
                CommandKind::AndWait,
                CommandForm::AndWait {
                    timeout: timeout.clone(),
                },
            )?;
        }

        tracing::debug!(
            capabilities = capabilities.len(),
            commands = builder.factories.len(),
            "command catalog built"
        );

        Ok(Self {
            factories: builder.factories,
        })
    }

    pub fn get(&self, command: &str) -> Option<&CommandFactory> {
        self.factories.get(command)
    }

    pub fn contains(&self, command: &str) -> bool {
        self.factories.contains_key(command)
    }

    /// Command names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandFactory> {
        self.factories.values()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolve every row into a step
    ///
    /// Resolution is all-or-nothing: the first unknown command aborts with
    /// [`Error::UnknownCommand`] and no steps are returned.
    pub fn resolve(&self, rows: Vec<Row>) -> Result<Vec<Step>> {
        let mut rows = rows.into_iter();
        let mut steps = Vec::new();

        while let Some(row) = rows.next() {
            let factory = self
                .get(&row.command)
                .ok_or_else(|| Error::UnknownCommand(row.command.clone()))?;
            steps.push(factory.create(&mut rows, &row.target, &row.value));
        }

        Ok(steps)
    }
}

struct Builder<'a> {
    reserved: &'a HashSet<&'a str>,
    factories: BTreeMap<String, CommandFactory>,
}

impl Builder<'_> {
    fn add(
        &mut self,
        method: &CapabilityMethod,
        command: String,
        kind: CommandKind,
        form: CommandForm,
    ) -> std::result::Result<(), String> {
        if self.reserved.contains(command.as_str()) || self.factories.contains_key(&command) {
            return Err(command);
        }

        self.factories.insert(
            command.clone(),
            CommandFactory {
                command,
                kind,
                method: method.clone(),
                form,
            },
        );
        Ok(())
    }
}

/// Process-wide, build-once holder for a catalog
///
/// The first caller builds; concurrent first callers block until that build
/// finishes and then share its result. A failed build is remembered too.
pub struct CatalogCell {
    cell: OnceLock<std::result::Result<CommandCatalog, String>>,
}

impl CatalogCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Get the catalog, building it on first access
    ///
    /// `capabilities` and `settings` are only consulted by the call that
    /// performs the build.
    pub fn get_or_build<F>(&self, capabilities: F, settings: &CatalogSettings) -> Result<&CommandCatalog>
    where
        F: FnOnce() -> CapabilitySet,
    {
        self.cell
            .get_or_init(|| {
                tracing::info!("building command catalog");
                CommandCatalog::assemble(&capabilities(), settings)
            })
            .as_ref()
            .map_err(|name| Error::CatalogConsistency { name: name.clone() })
    }

    /// The catalog if it has already been built successfully
    pub fn get(&self) -> Option<&CommandCatalog> {
        self.cell.get().and_then(|built| built.as_ref().ok())
    }
}

impl Default for CatalogCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings() -> CatalogSettings {
        CatalogSettings::default()
    }

    fn catalog(table: &[(&str, usize)]) -> CommandCatalog {
        CommandCatalog::build(&CapabilitySet::from_table(table), &settings()).unwrap()
    }

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_accessor_gets_six_commands() {
        let c = catalog(&[("getTitle", 0)]);
        let names: Vec<String> = c.names().map(str::to_string).collect();
        assert_eq!(
            names,
            sorted(&[
                "getTitle",
                "assertTitle",
                "assertNotTitle",
                "verifyTitle",
                "verifyNotTitle",
                "getTitleAndWait",
            ])
        );
    }

    #[test]
    fn test_present_accessor_negates_in_the_middle() {
        let c = catalog(&[("isTextPresent", 1)]);
        for name in [
            "isTextPresent",
            "assertTextPresent",
            "assertTextNotPresent",
            "verifyTextPresent",
            "verifyTextNotPresent",
            "isTextPresentAndWait",
        ] {
            assert!(c.contains(name), "missing {name}");
        }
        assert_eq!(c.len(), 6);
    }

    #[test]
    fn test_non_accessor_gets_two_commands() {
        let c = catalog(&[("click", 1), ("type", 2), ("refresh", 0)]);
        let names: Vec<String> = c.names().map(str::to_string).collect();
        assert_eq!(
            names,
            sorted(&["click", "clickAndWait", "type", "typeAndWait", "refresh", "refreshAndWait"])
        );
        assert!(c.iter().all(|f| !matches!(f.kind(), CommandKind::Assert | CommandKind::Verify)));
    }

    #[test]
    fn test_two_argument_accessor_has_no_checks() {
        let c = catalog(&[("getAttributeFromCookie", 2)]);
        assert_eq!(c.len(), 2);
        assert!(c.contains("getAttributeFromCookieAndWait"));
        assert!(!c.contains("assertAttributeFromCookie"));
    }

    #[test]
    fn test_wide_methods_are_skipped() {
        let c = catalog(&[("dragAndDropBetween", 3), ("click", 1)]);
        assert!(!c.contains("dragAndDropBetween"));
        assert!(!c.contains("dragAndDropBetweenAndWait"));
        assert!(c.contains("click"));
    }

    #[test]
    fn test_reserved_names_are_never_exposed() {
        let c = catalog(&[("start", 0), ("stop", 0), ("pause", 1), ("click", 1)]);
        for reserved in &settings().reserved {
            assert!(!c.contains(reserved), "{reserved} exposed");
        }
        // reserved methods contribute no derived commands either
        assert!(!c.contains("startAndWait"));
        assert!(!c.contains("pauseAndWait"));
    }

    #[test]
    fn test_reserved_list_is_configurable() {
        let settings = CatalogSettings {
            reserved: vec!["click".to_string()],
            ..CatalogSettings::default()
        };
        let c = CommandCatalog::build(
            &CapabilitySet::from_table(&[("click", 1), ("start", 0)]),
            &settings,
        )
        .unwrap();
        assert!(!c.contains("click"));
        assert!(c.contains("start"));
    }

    #[test]
    fn test_repeated_capability_registers_once() {
        let c = catalog(&[("click", 1), ("click", 2)]);
        assert_eq!(c.get("click").unwrap().method().arity, 1);
    }

    #[test]
    fn test_derived_name_collision_is_detected() {
        let err = CommandCatalog::build(
            &CapabilitySet::from_table(&[("getFoo", 0), ("isFoo", 0)]),
            &settings(),
        )
        .unwrap_err();
        match err {
            Error::CatalogConsistency { name } => assert_eq!(name, "assertFoo"),
            other => panic!("Expected CatalogConsistency, got {other:?}"),
        }
    }

    #[test]
    fn test_method_shadowing_derived_name_is_detected() {
        let err = CommandCatalog::build(
            &CapabilitySet::from_table(&[("getTitle", 0), ("assertTitle", 0)]),
            &settings(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::CatalogConsistency { name } if name == "assertTitle"));
    }

    #[test]
    fn test_derived_name_colliding_with_reserved_is_detected() {
        let settings = CatalogSettings {
            reserved: vec!["clickAndWait".to_string()],
            ..CatalogSettings::default()
        };
        let err = CommandCatalog::build(&CapabilitySet::from_table(&[("click", 1)]), &settings)
            .unwrap_err();
        assert!(matches!(err, Error::CatalogConsistency { .. }));
    }

    #[test]
    fn test_factories_bind_arguments_by_arity() {
        let c = catalog(&[("getTitle", 0), ("getText", 1), ("type", 2)]);
        let mut rest = std::iter::empty::<Row>();

        let s = c.get("getTitle").unwrap().create(&mut rest, "Home", "ignored");
        assert!(s.args.is_empty());

        let s = c.get("assertText").unwrap().create(&mut rest, "id=h1", "Hello");
        assert_eq!(s.args, vec!["id=h1"]);
        assert_eq!(
            s.action,
            StepAction::Compare {
                expected: "Hello".into(),
                expectation: Expectation::Equal
            }
        );

        let s = c.get("assertNotTitle").unwrap().create(&mut rest, "Home", "");
        assert_eq!(
            s.action,
            StepAction::Compare {
                expected: "Home".into(),
                expectation: Expectation::NotEqual
            }
        );

        let s = c.get("typeAndWait").unwrap().create(&mut rest, "id=q", "rust");
        assert_eq!(s.method, "type");
        assert_eq!(s.args, vec!["id=q", "rust"]);
        assert_eq!(
            s.action,
            StepAction::InvokeAndWait {
                timeout: "30000".into()
            }
        );
    }

    #[test]
    fn test_verify_matches_assert() {
        let c = catalog(&[("getTitle", 0)]);
        let mut rest = std::iter::empty::<Row>();
        let assert = c.get("assertTitle").unwrap().create(&mut rest, "Home", "");
        let verify = c.get("verifyTitle").unwrap().create(&mut rest, "Home", "");
        assert_eq!(assert.action, verify.action);
        assert_eq!(assert.args, verify.args);
    }

    #[test]
    fn test_factory_is_pure() {
        let c = catalog(&[("click", 1)]);
        let factory = c.get("clickAndWait").unwrap();
        let mut rest = std::iter::empty::<Row>();
        let first = factory.create(&mut rest, "id=go", "");
        let second = factory.create(&mut rest, "id=go", "");
        assert_eq!(first, second);
    }

    #[test]
    fn test_and_wait_timeout_comes_from_settings() {
        let settings = CatalogSettings {
            and_wait_timeout_ms: 1234,
            ..CatalogSettings::default()
        };
        let c = CommandCatalog::build(&CapabilitySet::from_table(&[("click", 1)]), &settings)
            .unwrap();
        let s = c.get("clickAndWait").unwrap().create(&mut std::iter::empty::<Row>(), "a", "");
        assert_eq!(
            s.action,
            StepAction::InvokeAndWait {
                timeout: "1234".into()
            }
        );
    }

    #[test]
    fn test_resolve_is_all_or_nothing() {
        let c = catalog(&[("click", 1), ("getTitle", 0)]);
        let rows = vec![
            Row::new("click", "id=a", ""),
            Row::new("assertTitle", "Home", ""),
            Row::new("frobnicate", "", ""),
            Row::new("click", "id=b", ""),
        ];
        match c.resolve(rows).unwrap_err() {
            Error::UnknownCommand(name) => assert_eq!(name, "frobnicate"),
            other => panic!("Expected UnknownCommand, got {other:?}"),
        }

        let steps = c
            .resolve(vec![Row::new("click", "id=a", ""), Row::new("assertTitle", "Home", "")])
            .unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].command, "assertTitle");
    }

    #[test]
    fn test_cell_builds_exactly_once_under_contention() {
        let cell = CatalogCell::new();
        let builds = AtomicUsize::new(0);
        let settings = settings();

        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let catalog = cell
                            .get_or_build(
                                || {
                                    builds.fetch_add(1, Ordering::SeqCst);
                                    CapabilitySet::from_table(&[("getTitle", 0), ("click", 1)])
                                },
                                &settings,
                            )
                            .unwrap();
                        catalog as *const CommandCatalog as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(cell.get().map(CommandCatalog::len), Some(8));
    }

    #[test]
    fn test_cell_remembers_failed_build() {
        let cell = CatalogCell::new();
        let settings = settings();
        let broken = || CapabilitySet::from_table(&[("getFoo", 0), ("isFoo", 0)]);

        assert!(cell.get_or_build(broken, &settings).is_err());
        assert!(cell
            .get_or_build(|| CapabilitySet::from_table(&[("click", 1)]), &settings)
            .is_err());
        assert!(cell.get().is_none());
    }
}
