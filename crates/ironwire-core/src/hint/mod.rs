//! Definition hints: configuration strategies that replace default class
//! resolution for an identifier.
//!
//! A hint turns one requested identifier into one or more
//! `(identifier, definition)` pairs for the resolver to merge into the graph.
//! Exact hints are keyed by identifier; wildcard hints are tried afterwards in
//! declared order.

pub mod pattern;

use std::collections::BTreeMap;

use ironwire_common::config::{CompilerConfig, ContextHintConfig, HintConfig, OverrideValue, WildcardHintConfig};
use ironwire_common::error::{IronwireError, Result};
use ironwire_common::types::{Identifier, Scope};

use self::pattern::Pattern;
use crate::definition::{ClassDefinition, ContextDependentDefinition, Definition, ReferenceDefinition};
use crate::entry_point::EntryPoints;

/// Bind an identifier to a class, or change the scope and overrides of its own class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHint {
    /// The implementing class; equal to the hinted identifier for a self-binding.
    pub class: Identifier,
    /// Lifecycle of the class.
    pub scope: Scope,
    /// Constructor parameter overrides of the class.
    pub parameters: BTreeMap<String, OverrideValue>,
    /// Field overrides of the class.
    pub fields: BTreeMap<String, OverrideValue>,
}

impl ClassHint {
    /// A singleton binding to `class` without overrides.
    #[must_use]
    pub fn singleton(class: impl Into<Identifier>) -> Self {
        Self::new(class, Scope::Singleton)
    }

    /// A prototype binding to `class` without overrides.
    #[must_use]
    pub fn prototype(class: impl Into<Identifier>) -> Self {
        Self::new(class, Scope::Prototype)
    }

    fn new(class: impl Into<Identifier>, scope: Scope) -> Self {
        Self {
            class: class.into(),
            scope,
            parameters: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }
}

/// Choose the implementation depending on the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDependentHint {
    /// Class used for consumers without a binding.
    pub default: Option<Identifier>,
    /// Consumer to implementing class.
    pub consumers: BTreeMap<Identifier, Identifier>,
    /// Lifecycle of every implementation.
    pub scope: Scope,
}

impl From<&ContextHintConfig> for ContextDependentHint {
    fn from(config: &ContextHintConfig) -> Self {
        Self {
            default: config.default.clone(),
            consumers: config.consumers.clone(),
            scope: config.scope,
        }
    }
}

/// Bind every identifier matching `source` to the class named by `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardHint {
    /// Pattern matched against requested identifiers.
    pub source: Pattern,
    /// Pattern receiving the captured placeholders.
    pub target: Pattern,
    /// Lifecycle of the implementations.
    pub scope: Scope,
}

impl WildcardHint {
    /// Parses both patterns and checks that their placeholders line up.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid patterns or mismatched placeholder counts.
    pub fn new(source: &str, target: &str, scope: Scope) -> Result<Self> {
        let source_pattern = Pattern::parse(source)?;
        let target_pattern = Pattern::parse(target)?;
        if source_pattern.placeholders() != target_pattern.placeholders() {
            return Err(IronwireError::Config {
                message: format!(
                    "wildcard hint \"{source}\" -> \"{target}\" has {} source and {} target placeholders",
                    source_pattern.placeholders(),
                    target_pattern.placeholders()
                ),
            });
        }
        Ok(Self {
            source: source_pattern,
            target: target_pattern,
            scope,
        })
    }

    /// The class `id` is bound to, if `id` matches.
    #[must_use]
    pub fn target_for(&self, id: &Identifier) -> Option<Identifier> {
        let captures = self.source.captures(id.as_str())?;
        self.target.substitute(&captures).map(Identifier::from)
    }
}

/// A configuration strategy producing definitions for an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionHint {
    /// Explicit class binding or scope override.
    Class(ClassHint),
    /// Consumer-dependent binding.
    ContextDependent(ContextDependentHint),
    /// Pattern binding.
    Wildcard(WildcardHint),
}

impl DefinitionHint {
    /// Produces the definitions replacing default resolution of `id`.
    ///
    /// The first pair always defines `id`. Implementation classes follow,
    /// unless another hint in `hints` is responsible for them.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a wildcard hint does not match `id`.
    pub fn to_definitions(
        &self,
        entry_points: &EntryPoints,
        hints: &HintTable,
        id: &Identifier,
        file_based: bool,
    ) -> Result<Vec<(Identifier, Definition)>> {
        match self {
            Self::Class(hint) => Ok(bind_class(entry_points, hints, id, hint, file_based)),
            Self::Wildcard(hint) => {
                let class = hint.target_for(id).ok_or_else(|| IronwireError::Config {
                    message: format!("wildcard hint \"{}\" does not match \"{id}\"", hint.source),
                })?;
                let class_hint = ClassHint::new(class, hint.scope);
                Ok(bind_class(entry_points, hints, id, &class_hint, file_based))
            }
            Self::ContextDependent(hint) => Ok(bind_context(entry_points, hints, id, hint, file_based)),
        }
    }
}

fn class_definition(
    entry_points: &EntryPoints,
    class: &Identifier,
    hint: &ClassHint,
    file_based: bool,
) -> Definition {
    let entry = entry_points.find(class);
    let mut definition = ClassDefinition::new(class.clone(), hint.scope)
        .entry_point(entry.is_some())
        .file_based(file_based)
        .with_overrides(&hint.parameters, &hint.fields);
    if let Some(entry) = entry {
        definition = definition.with_overrides(&entry.parameters, &entry.fields);
    }
    Definition::Class(definition)
}

fn bind_class(
    entry_points: &EntryPoints,
    hints: &HintTable,
    id: &Identifier,
    hint: &ClassHint,
    file_based: bool,
) -> Vec<(Identifier, Definition)> {
    if hint.class == *id {
        return vec![(id.clone(), class_definition(entry_points, id, hint, file_based))];
    }

    let mut reference = ReferenceDefinition::new(id.clone(), hint.class.clone(), hint.scope);
    reference.entry_point = entry_points.contains(id);
    reference.file_based = file_based;

    let mut definitions = vec![(id.clone(), Definition::Reference(reference))];
    if let Some(definition) = implementation(entry_points, hints, &hint.class, hint, file_based) {
        definitions.push((hint.class.clone(), definition));
    }
    definitions
}

/// The class definition of an implementation, honouring a self-binding hint of
/// the implementation itself. Returns `None` when another exact hint aliases it.
///
/// Wildcard hints never apply to an implementation: a target such as
/// `Mysql*Repository` would otherwise match `*Repository` again.
fn implementation(
    entry_points: &EntryPoints,
    hints: &HintTable,
    class: &Identifier,
    hint: &ClassHint,
    file_based: bool,
) -> Option<Definition> {
    match hints.exact(class) {
        None => Some(class_definition(entry_points, class, hint, file_based)),
        Some(DefinitionHint::Class(own)) if own.class == *class => {
            let merged = ClassHint {
                class: class.clone(),
                scope: hint.scope,
                parameters: own
                    .parameters
                    .iter()
                    .chain(&hint.parameters)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                fields: own
                    .fields
                    .iter()
                    .chain(&hint.fields)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            };
            Some(class_definition(entry_points, class, &merged, file_based))
        }
        Some(_) => {
            tracing::trace!(%class, "implementation is resolved through its own hint");
            None
        }
    }
}

fn bind_context(
    entry_points: &EntryPoints,
    hints: &HintTable,
    id: &Identifier,
    hint: &ContextDependentHint,
    file_based: bool,
) -> Vec<(Identifier, Definition)> {
    let branch = |class: &Identifier| {
        let mut reference = ReferenceDefinition::new(id.clone(), class.clone(), hint.scope);
        reference.file_based = file_based;
        Definition::Reference(reference)
    };

    let definition = ContextDependentDefinition {
        id: id.clone(),
        scope: hint.scope,
        entry_point: entry_points.contains(id),
        default: hint.default.as_ref().map(|class| Box::new(branch(class))),
        branches: hint
            .consumers
            .iter()
            .map(|(consumer, class)| (consumer.clone(), branch(class)))
            .collect(),
    };

    let mut definitions = vec![(id.clone(), Definition::ContextDependent(definition))];
    let mut classes: Vec<&Identifier> = hint.consumers.values().chain(hint.default.as_ref()).collect();
    classes.sort();
    classes.dedup();
    for class in classes {
        let class_hint = ClassHint::new(class.clone(), hint.scope);
        if let Some(definition) = implementation(entry_points, hints, class, &class_hint, file_based) {
            definitions.push((class.clone(), definition));
        }
    }
    definitions
}

/// Every hint of one compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HintTable {
    exact: BTreeMap<Identifier, DefinitionHint>,
    wildcards: Vec<DefinitionHint>,
}

impl HintTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the `hints` and `wildcard_hints` sections.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid wildcard hint.
    pub fn from_config(config: &CompilerConfig) -> Result<Self> {
        let mut table = Self::new();
        for (id, hint) in &config.hints {
            let hint = match hint {
                HintConfig::Context { context } => DefinitionHint::ContextDependent(context.into()),
                HintConfig::Class {
                    class,
                    scope,
                    parameters,
                    fields,
                } => DefinitionHint::Class(ClassHint {
                    class: class.clone(),
                    scope: *scope,
                    parameters: parameters.clone(),
                    fields: fields.clone(),
                }),
                HintConfig::Scope {
                    scope,
                    parameters,
                    fields,
                } => DefinitionHint::Class(ClassHint {
                    class: id.clone(),
                    scope: *scope,
                    parameters: parameters.clone(),
                    fields: fields.clone(),
                }),
            };
            table.insert(id.clone(), hint);
        }
        for WildcardHintConfig { source, target, scope } in &config.wildcard_hints {
            table.push_wildcard(WildcardHint::new(source, target, *scope)?);
        }
        Ok(table)
    }

    /// Registers a hint for exactly `id`, replacing any previous one.
    pub fn insert(&mut self, id: impl Into<Identifier>, hint: DefinitionHint) {
        let _ = self.exact.insert(id.into(), hint);
    }

    /// Appends a wildcard hint.
    pub fn push_wildcard(&mut self, hint: WildcardHint) {
        self.wildcards.push(DefinitionHint::Wildcard(hint));
    }

    /// The hint responsible for `id`: the exact hint, else the first matching wildcard.
    #[must_use]
    pub fn find(&self, id: &Identifier) -> Option<&DefinitionHint> {
        self.exact.get(id).or_else(|| {
            self.wildcards.iter().find(|hint| match hint {
                DefinitionHint::Wildcard(wildcard) => wildcard.source.matches(id.as_str()),
                DefinitionHint::Class(_) | DefinitionHint::ContextDependent(_) => false,
            })
        })
    }

    /// The hint registered for exactly `id`, ignoring wildcards.
    #[must_use]
    pub fn exact(&self, id: &Identifier) -> Option<&DefinitionHint> {
        self.exact.get(id)
    }

    /// Number of exact and wildcard hints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcards.len()
    }

    /// Returns `true` if no hint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use ironwire_common::config::EntryPointConfig;
    use ironwire_common::types::Literal;

    use super::*;
    use crate::metadata::StaticMetadata;

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    fn entries(ids: &[&str]) -> EntryPoints {
        let configs: Vec<EntryPointConfig> = ids.iter().map(|i| EntryPointConfig::class(*i)).collect();
        EntryPoints::from_config(&configs, &StaticMetadata::new()).expect("entries")
    }

    #[test]
    fn class_hint_produces_reference_and_implementation() {
        let hints = HintTable::new();
        let hint = DefinitionHint::Class(ClassHint::singleton("app::InMemoryRepository"));
        let defs = hint
            .to_definitions(&entries(&[]), &hints, &id("app::RepositoryInterface"), false)
            .expect("definitions");

        assert_eq!(defs.len(), 2);
        let Definition::Reference(reference) = &defs[0].1 else {
            panic!("expected reference, got {:?}", defs[0].1);
        };
        assert_eq!(reference.target, id("app::InMemoryRepository"));
        assert!(matches!(&defs[1].1, Definition::Class(c) if c.id == id("app::InMemoryRepository")));
    }

    #[test]
    fn self_binding_changes_scope_only() {
        let hints = HintTable::new();
        let hint = DefinitionHint::Class(ClassHint::prototype("app::Request"));
        let defs = hint
            .to_definitions(&entries(&["app::Request"]), &hints, &id("app::Request"), true)
            .expect("definitions");

        assert_eq!(defs.len(), 1);
        let Definition::Class(class) = &defs[0].1 else {
            panic!("expected class");
        };
        assert_eq!(class.scope, Scope::Prototype);
        assert!(class.entry_point);
        assert!(class.file_based);
    }

    #[test]
    fn implementation_with_own_alias_is_left_to_its_hint() {
        let mut hints = HintTable::new();
        hints.insert("app::B", DefinitionHint::Class(ClassHint::singleton("app::C")));
        let hint = DefinitionHint::Class(ClassHint::singleton("app::B"));
        let defs = hint
            .to_definitions(&entries(&[]), &hints, &id("app::A"), false)
            .expect("definitions");
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn implementation_merges_its_own_overrides() {
        let mut own = ClassHint::singleton("app::Mailer");
        let _ = own
            .parameters
            .insert("host".into(), OverrideValue::Value(Literal::String("localhost".into())));
        let mut hints = HintTable::new();
        hints.insert("app::Mailer", DefinitionHint::Class(own));

        let hint = DefinitionHint::Class(ClassHint::prototype("app::Mailer"));
        let defs = hint
            .to_definitions(&entries(&[]), &hints, &id("app::MailerInterface"), false)
            .expect("definitions");
        let Definition::Class(class) = &defs[1].1 else {
            panic!("expected class");
        };
        assert_eq!(class.scope, Scope::Prototype);
        assert!(class.overridden_parameters.contains_key("host"));
    }

    #[test]
    fn wildcard_hint_binds_matching_identifier() {
        let mut hints = HintTable::new();
        hints.push_wildcard(
            WildcardHint::new("*RepositoryInterface", "Mysql*Repository", Scope::Singleton).expect("hint"),
        );
        let requested = id("UserRepositoryInterface");
        let hint = hints.find(&requested).expect("wildcard matches");
        let defs = hint
            .to_definitions(&entries(&[]), &hints, &requested, false)
            .expect("definitions");

        assert!(matches!(&defs[0].1, Definition::Reference(r) if r.target == id("MysqlUserRepository")));
        assert!(matches!(&defs[1].1, Definition::Class(c) if c.id == id("MysqlUserRepository")));
    }

    #[test]
    fn exact_hint_wins_over_wildcard() {
        let mut hints = HintTable::new();
        hints.push_wildcard(WildcardHint::new("app::*Port", "app::Http*", Scope::Singleton).expect("hint"));
        hints.insert("app::MailPort", DefinitionHint::Class(ClassHint::singleton("app::SmtpMail")));
        assert!(matches!(hints.find(&id("app::MailPort")), Some(DefinitionHint::Class(_))));
        assert!(matches!(hints.find(&id("app::SmsPort")), Some(DefinitionHint::Wildcard(_))));
        assert!(hints.find(&id("app::Other")).is_none());
        assert_eq!(hints.len(), 2);
    }

    #[test]
    fn wildcard_placeholder_counts_must_match() {
        let err = WildcardHint::new("*Port", "Http", Scope::Singleton).unwrap_err();
        assert!(err.to_string().contains("placeholders"), "got: {err}");
    }

    #[test]
    fn context_hint_produces_dispatch_table_and_implementations() {
        let hint = DefinitionHint::ContextDependent(ContextDependentHint {
            default: Some(id("app::FileLogger")),
            consumers: BTreeMap::from([
                (id("app::Service"), id("app::NullLogger")),
                (id("app::Worker"), id("app::NullLogger")),
            ]),
            scope: Scope::Singleton,
        });
        let defs = hint
            .to_definitions(&entries(&[]), &HintTable::new(), &id("app::Logger"), false)
            .expect("definitions");

        let names: Vec<&str> = defs.iter().map(|(i, _)| i.as_str()).collect();
        assert_eq!(names, vec!["app::Logger", "app::FileLogger", "app::NullLogger"]);
        let Definition::ContextDependent(context) = &defs[0].1 else {
            panic!("expected context-dependent definition");
        };
        assert_eq!(context.branches.len(), 2);
        assert!(context.default.is_some());
    }

    #[test]
    fn table_from_config_parses_every_section() {
        let config = CompilerConfig::from_yaml(
            r"
hints:
  app::RepositoryInterface:
    class: app::InMemoryRepository
  app::Request:
    scope: prototype
wildcard_hints:
  - source: app::*Port
    target: app::Http*Adapter
",
        )
        .expect("config");
        let table = HintTable::from_config(&config).expect("table");
        assert_eq!(table.len(), 3);
        assert!(matches!(
            table.find(&id("app::Request")),
            Some(DefinitionHint::Class(ClassHint { class, scope: Scope::Prototype, .. })) if *class == id("app::Request")
        ));
    }
}
