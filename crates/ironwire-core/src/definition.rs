//! Graph nodes describing how to build the instance behind one identifier.
//!
//! A [`Definition`] is a closed sum type; the resolver and the compiler match
//! on it exhaustively, so a new flavour is a compile-time checked change.

use std::collections::{BTreeMap, BTreeSet};

use ironwire_common::config::OverrideValue;
use ironwire_common::types::{Identifier, Literal, Scope};
use serde::Serialize;

/// Where the value of a constructor argument or injected field comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentSource {
    /// Built by the factory of another identifier.
    Dependency(Identifier),
    /// A literal from configuration or a parameter default.
    Value(Literal),
    /// A Rust path emitted verbatim.
    Reference(String),
}

impl From<&OverrideValue> for ArgumentSource {
    fn from(value: &OverrideValue) -> Self {
        match value {
            OverrideValue::Reference { reference } => Self::Reference(reference.clone()),
            OverrideValue::Value(literal) => Self::Value(literal.clone()),
        }
    }
}

/// A positional constructor argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorArgument {
    /// Zero-based position in the parameter list.
    pub position: usize,
    /// Parameter name.
    pub name: String,
    /// Value source.
    pub source: ArgumentSource,
}

/// A field assigned after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjectedField {
    /// Field name.
    pub name: String,
    /// Value source.
    pub source: ArgumentSource,
}

/// How often one consumer references a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Referrer {
    /// Number of members of the consumer bound to the definition.
    pub count: u32,
    /// Whether the consumer is itself a singleton.
    pub singleton: bool,
}

/// Per-consumer reference counts, keyed by consumer identifier.
pub type Referrers = BTreeMap<Identifier, Referrer>;

/// Progress of a class definition's dependency discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// Dependencies not yet discovered.
    #[default]
    Pending,
    /// Dependencies are being discovered further up the call stack.
    InProgress,
    /// Dependencies discovered.
    Resolved,
}

/// A concrete type built from constructor arguments and injected fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDefinition {
    /// Identifier of the type.
    pub id: Identifier,
    /// Lifecycle.
    pub scope: Scope,
    /// Exposed as a public retrieval method.
    pub entry_point: bool,
    /// Emitted into a separate artifact.
    pub file_based: bool,
    /// Constructor arguments in parameter order.
    pub arguments: Vec<ConstructorArgument>,
    /// Fields assigned after construction.
    pub fields: Vec<InjectedField>,
    /// Parameter overrides from configuration.
    pub overridden_parameters: BTreeMap<String, OverrideValue>,
    /// Field overrides from configuration.
    pub overridden_fields: BTreeMap<String, OverrideValue>,
    /// Consumers referencing this definition.
    pub referrers: Referrers,
    /// Dependency discovery progress.
    pub state: ResolutionState,
    /// Source unit the type lives in, activated by autoload proxies.
    pub source_unit: Option<String>,
}

impl ClassDefinition {
    /// Creates an unresolved class definition.
    #[must_use]
    pub fn new(id: Identifier, scope: Scope) -> Self {
        Self {
            id,
            scope,
            entry_point: false,
            file_based: false,
            arguments: Vec::new(),
            fields: Vec::new(),
            overridden_parameters: BTreeMap::new(),
            overridden_fields: BTreeMap::new(),
            referrers: Referrers::new(),
            state: ResolutionState::Pending,
            source_unit: None,
        }
    }

    /// Marks the definition as an entry point.
    #[must_use]
    pub const fn entry_point(mut self, entry_point: bool) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Requests file-based placement.
    #[must_use]
    pub const fn file_based(mut self, file_based: bool) -> Self {
        self.file_based = file_based;
        self
    }

    /// Merges parameter and field overrides; later values win.
    #[must_use]
    pub fn with_overrides(
        mut self,
        parameters: &BTreeMap<String, OverrideValue>,
        fields: &BTreeMap<String, OverrideValue>,
    ) -> Self {
        self.overridden_parameters
            .extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.overridden_fields
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    fn dependencies(&self) -> BTreeSet<Identifier> {
        self.arguments
            .iter()
            .map(|a| &a.source)
            .chain(self.fields.iter().map(|f| &f.source))
            .filter_map(|source| match source {
                ArgumentSource::Dependency(id) => Some(id.clone()),
                ArgumentSource::Value(_) | ArgumentSource::Reference(_) => None,
            })
            .collect()
    }
}

/// An alias: the identifier is satisfied by building another one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceDefinition {
    /// The alias identifier.
    pub id: Identifier,
    /// The identifier actually built.
    pub target: Identifier,
    /// Lifecycle declared for the binding.
    pub scope: Scope,
    /// Exposed as a public retrieval method.
    pub entry_point: bool,
    /// Emitted into a separate artifact.
    pub file_based: bool,
    /// Binds a container interface to the container itself.
    pub container_reference: bool,
    /// Consumers referencing this definition.
    pub referrers: Referrers,
}

impl ReferenceDefinition {
    /// Creates an alias from `id` to `target`.
    #[must_use]
    pub fn new(id: Identifier, target: Identifier, scope: Scope) -> Self {
        Self {
            id,
            target,
            scope,
            entry_point: false,
            file_based: false,
            container_reference: false,
            referrers: Referrers::new(),
        }
    }
}

/// The container's own definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfDefinition {
    /// Identifier of the container type.
    pub id: Identifier,
}

/// A per-consumer dispatch table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextDependentDefinition {
    /// The context-dependent identifier.
    pub id: Identifier,
    /// Lifecycle of every branch.
    pub scope: Scope,
    /// Exposed as a public retrieval method.
    pub entry_point: bool,
    /// Branch used for consumers missing from `branches`.
    pub default: Option<Box<Definition>>,
    /// Consumer identifier to branch.
    pub branches: BTreeMap<Identifier, Definition>,
}

impl ContextDependentDefinition {
    /// Returns the branch applying to `consumer`, falling back to the default.
    #[must_use]
    pub fn branch_for(&self, consumer: Option<&Identifier>) -> Option<&Definition> {
        consumer
            .and_then(|c| self.branches.get(c))
            .or(self.default.as_deref())
    }
}

/// An entry point whose construction is preceded by source activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoloadedDefinition {
    /// The wrapped definition.
    pub inner: Box<Definition>,
    /// The proxy body is emitted into a separate artifact.
    pub file_based: bool,
    /// Source units activated before any graph-derived unit.
    pub always_activated: Vec<String>,
}

/// How to build the instance behind one identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Definition {
    /// Plain construction.
    Class(ClassDefinition),
    /// Alias to another identifier.
    Reference(ReferenceDefinition),
    /// The container itself.
    SelfReference(SelfDefinition),
    /// Consumer-dependent choice.
    ContextDependent(ContextDependentDefinition),
    /// Autoload proxy around an entry point.
    Autoloaded(AutoloadedDefinition),
}

impl Definition {
    /// Identifier this definition builds.
    #[must_use]
    pub fn id(&self) -> &Identifier {
        match self {
            Self::Class(d) => &d.id,
            Self::Reference(d) => &d.id,
            Self::SelfReference(d) => &d.id,
            Self::ContextDependent(d) => &d.id,
            Self::Autoloaded(d) => d.inner.id(),
        }
    }

    /// Short name of the variant, used in plans and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Reference(_) => "reference",
            Self::SelfReference(_) => "self",
            Self::ContextDependent(_) => "context-dependent",
            Self::Autoloaded(_) => "autoloaded",
        }
    }

    /// Declared lifecycle.
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            Self::Class(d) => d.scope,
            Self::Reference(d) => d.scope,
            Self::SelfReference(_) => Scope::Singleton,
            Self::ContextDependent(d) => d.scope,
            Self::Autoloaded(d) => d.inner.scope(),
        }
    }

    /// Whether the container exposes this identifier publicly.
    #[must_use]
    pub fn is_entry_point(&self) -> bool {
        match self {
            Self::Class(d) => d.entry_point,
            Self::Reference(d) => d.entry_point,
            Self::SelfReference(_) => false,
            Self::ContextDependent(d) => d.entry_point,
            Self::Autoloaded(d) => d.inner.is_entry_point(),
        }
    }

    /// Whether the factory body lives in a separate artifact.
    #[must_use]
    pub fn is_file_based(&self) -> bool {
        match self {
            Self::Class(d) => d.file_based,
            Self::Reference(d) => d.file_based,
            Self::SelfReference(_) | Self::ContextDependent(_) => false,
            Self::Autoloaded(d) => d.file_based,
        }
    }

    /// Keeps the factory body in the main artifact.
    pub fn clear_file_placement(&mut self) {
        match self {
            Self::Class(d) => d.file_based = false,
            Self::Reference(d) => d.file_based = false,
            Self::SelfReference(_) => {}
            Self::ContextDependent(d) => {
                d.default.iter_mut().for_each(|branch| branch.clear_file_placement());
                d.branches.values_mut().for_each(Self::clear_file_placement);
            }
            Self::Autoloaded(d) => {
                d.file_based = false;
                d.inner.clear_file_placement();
            }
        }
    }

    /// True only for a class definition whose dependencies are still undiscovered.
    #[must_use]
    pub fn needs_dependency_resolution(&self) -> bool {
        match self {
            Self::Class(d) => d.state == ResolutionState::Pending,
            Self::Reference(_) | Self::SelfReference(_) | Self::ContextDependent(_) => false,
            Self::Autoloaded(d) => d.inner.needs_dependency_resolution(),
        }
    }

    /// Direct construction-time dependencies.
    #[must_use]
    pub fn class_dependencies(&self) -> BTreeSet<Identifier> {
        match self {
            Self::Class(d) => d.dependencies(),
            Self::Reference(d) if d.container_reference => BTreeSet::new(),
            Self::Reference(d) => BTreeSet::from([d.target.clone()]),
            Self::SelfReference(_) => BTreeSet::new(),
            Self::ContextDependent(d) => d
                .branches
                .values()
                .chain(d.default.as_deref())
                .flat_map(Self::class_dependencies)
                .collect(),
            Self::Autoloaded(d) => d.inner.class_dependencies(),
        }
    }

    /// Per-consumer reference counts, for the variants that track them.
    #[must_use]
    pub fn referrers(&self) -> Option<&Referrers> {
        match self {
            Self::Class(d) => Some(&d.referrers),
            Self::Reference(d) => Some(&d.referrers),
            Self::SelfReference(_) | Self::ContextDependent(_) => None,
            Self::Autoloaded(d) => d.inner.referrers(),
        }
    }

    /// Records one more reference from `consumer`.
    pub fn increase_reference_count(&mut self, consumer: &Identifier, consumer_singleton: bool) {
        let referrers = match self {
            Self::Class(d) => &mut d.referrers,
            Self::Reference(d) => &mut d.referrers,
            Self::SelfReference(_) | Self::ContextDependent(_) => return,
            Self::Autoloaded(d) => {
                d.inner.increase_reference_count(consumer, consumer_singleton);
                return;
            }
        };
        let referrer = referrers.entry(consumer.clone()).or_default();
        referrer.count += 1;
        referrer.singleton |= consumer_singleton;
    }

    /// Source unit of the built type, if known.
    #[must_use]
    pub fn source_unit(&self) -> Option<&str> {
        match self {
            Self::Class(d) => d.source_unit.as_deref(),
            Self::Autoloaded(d) => d.inner.source_unit(),
            Self::Reference(_) | Self::SelfReference(_) | Self::ContextDependent(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    #[test]
    fn new_class_definition_needs_resolution() {
        let def = Definition::Class(ClassDefinition::new(id("app::A"), Scope::Singleton));
        assert!(def.needs_dependency_resolution());
        assert!(def.class_dependencies().is_empty());
    }

    #[test]
    fn class_dependencies_skip_literal_arguments() {
        let mut class = ClassDefinition::new(id("app::A"), Scope::Singleton);
        class.arguments = vec![
            ConstructorArgument {
                position: 0,
                name: "b".into(),
                source: ArgumentSource::Dependency(id("app::B")),
            },
            ConstructorArgument {
                position: 1,
                name: "retries".into(),
                source: ArgumentSource::Value(Literal::Integer(3)),
            },
        ];
        class.fields = vec![InjectedField {
            name: "clock".into(),
            source: ArgumentSource::Dependency(id("app::Clock")),
        }];
        let deps = Definition::Class(class).class_dependencies();
        assert_eq!(deps, BTreeSet::from([id("app::B"), id("app::Clock")]));
    }

    #[test]
    fn reference_counts_accumulate_per_consumer() {
        let mut def = Definition::Class(ClassDefinition::new(id("app::B"), Scope::Singleton));
        def.increase_reference_count(&id("app::A"), false);
        def.increase_reference_count(&id("app::A"), true);
        def.increase_reference_count(&id("app::C"), false);
        let referrers = def.referrers().expect("class tracks referrers");
        assert_eq!(referrers[&id("app::A")], Referrer { count: 2, singleton: true });
        assert_eq!(referrers[&id("app::C")], Referrer { count: 1, singleton: false });
    }

    #[test]
    fn container_reference_has_no_class_dependency() {
        let mut reference = ReferenceDefinition::new(id("di::ContainerInterface"), id("Container"), Scope::Singleton);
        reference.container_reference = true;
        assert!(Definition::Reference(reference).class_dependencies().is_empty());
    }

    #[test]
    fn context_dependent_falls_back_to_default() {
        let branch = |target: &str| {
            Definition::Reference(ReferenceDefinition::new(id("app::Log"), id(target), Scope::Singleton))
        };
        let def = ContextDependentDefinition {
            id: id("app::Log"),
            scope: Scope::Singleton,
            entry_point: false,
            default: Some(Box::new(branch("app::FileLog"))),
            branches: BTreeMap::from([(id("app::Service"), branch("app::NullLog"))]),
        };
        let chosen = def.branch_for(Some(&id("app::Service"))).expect("branch");
        assert_eq!(chosen.class_dependencies(), BTreeSet::from([id("app::NullLog")]));
        let fallback = def.branch_for(Some(&id("app::Other"))).expect("default");
        assert_eq!(fallback.class_dependencies(), BTreeSet::from([id("app::FileLog")]));
        let direct = def.branch_for(None).expect("default");
        assert_eq!(direct.class_dependencies(), BTreeSet::from([id("app::FileLog")]));

        let wrapped = Definition::ContextDependent(def);
        assert_eq!(
            wrapped.class_dependencies(),
            BTreeSet::from([id("app::FileLog"), id("app::NullLog")])
        );
    }

    #[test]
    fn autoloaded_delegates_to_inner() {
        let mut class = ClassDefinition::new(id("app::A"), Scope::Prototype).entry_point(true);
        class.source_unit = Some("src/a.rs".into());
        let def = Definition::Autoloaded(AutoloadedDefinition {
            inner: Box::new(Definition::Class(class)),
            file_based: true,
            always_activated: Vec::new(),
        });
        assert_eq!(def.id().as_str(), "app::A");
        assert_eq!(def.scope(), Scope::Prototype);
        assert!(def.is_entry_point());
        assert!(def.is_file_based());
        assert_eq!(def.source_unit(), Some("src/a.rs"));
        assert_eq!(def.kind(), "autoloaded");
    }
}
