//! Walks from the entry points to a fully resolved definition graph.
//!
//! Every identifier gets exactly one definition; an identifier that is already
//! present is never re-created, which is what makes cyclic and diamond shaped
//! dependencies terminate. Each [`DependencyResolver::resolve_all`] or
//! [`DependencyResolver::resolve_one`] call owns a fresh graph.

use std::collections::{BTreeMap, BTreeSet};

use ironwire_common::config::{CompilerConfig, InjectionConfig, OverrideValue};
use ironwire_common::error::{IronwireError, MemberKind, Result};
use ironwire_common::types::{Identifier, Literal, Scope};

use crate::autoload::AutoloadPolicy;
use crate::definition::{
    ArgumentSource, ClassDefinition, ConstructorArgument, Definition, InjectedField, ReferenceDefinition,
    ResolutionState, SelfDefinition,
};
use crate::entry_point::{EntryPoint, EntryPoints};
use crate::graph::DefinitionGraph;
use crate::hint::HintTable;
use crate::metadata::MetadataProvider;

/// When the lookup happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupMode {
    /// Container generation; file-based placement follows configuration.
    #[default]
    Compile,
    /// Lookup against an already generated container; nothing is file-based.
    Runtime,
}

/// Resolves entry points against hints and introspection metadata.
pub struct DependencyResolver<'a> {
    metadata: &'a dyn MetadataProvider,
    entry_points: EntryPoints,
    hints: HintTable,
    policy: AutoloadPolicy,
    injection: InjectionConfig,
    file_based: bool,
    container: Identifier,
    interfaces: Vec<Identifier>,
    mode: LookupMode,
}

impl std::fmt::Debug for DependencyResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("entry_points", &self.entry_points)
            .field("hints", &self.hints.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<'a> DependencyResolver<'a> {
    /// Prepares a resolver for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry point or hint declaration is invalid.
    pub fn new(config: &CompilerConfig, metadata: &'a dyn MetadataProvider) -> Result<Self> {
        Ok(Self {
            metadata,
            entry_points: EntryPoints::from_config(&config.entry_points, metadata)?,
            hints: HintTable::from_config(config)?,
            policy: AutoloadPolicy::from_config(&config.autoload, &config.file_based),
            injection: config.injection,
            file_based: config.file_based.enabled,
            container: config.container.name.clone(),
            interfaces: config.container.interfaces.clone(),
            mode: LookupMode::Compile,
        })
    }

    /// Sets the lookup mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: LookupMode) -> Self {
        self.mode = mode;
        self
    }

    /// The expanded entry points.
    #[must_use]
    pub const fn entry_points(&self) -> &EntryPoints {
        &self.entry_points
    }

    /// Resolves every declared entry point.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error encountered.
    pub fn resolve_all(&self) -> Result<DefinitionGraph> {
        let ids = self.entry_points.identifiers();
        tracing::info!(entry_points = ids.len(), "resolving container");

        let mut pass = Pass::new(self);
        for id in &ids {
            pass.graph.declare_entry_point(id);
            pass.resolve(id, None, self.entry_points.find(id))?;
        }
        let graph = pass.finish()?;
        tracing::info!(definitions = graph.len(), "container resolved");
        Ok(graph)
    }

    /// Resolves a single entry point and its transitive dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`IronwireError::NotFound`] if `id` is not a declared entry
    /// point, or the first resolution error encountered.
    pub fn resolve_one(&self, id: &Identifier) -> Result<DefinitionGraph> {
        let entry = self.entry_points.find(id).ok_or_else(|| IronwireError::NotFound {
            kind: "entry point",
            id: id.to_string(),
        })?;
        tracing::info!(%id, "resolving entry point");

        let mut pass = Pass::new(self);
        pass.graph.declare_entry_point(id);
        pass.resolve(id, None, Some(entry))?;
        pass.finish()
    }
}

/// One resolution pass over a fresh graph.
struct Pass<'r, 'a> {
    resolver: &'r DependencyResolver<'a>,
    graph: DefinitionGraph,
}

impl<'r, 'a> Pass<'r, 'a> {
    fn new(resolver: &'r DependencyResolver<'a>) -> Self {
        let mut graph = DefinitionGraph::new();
        let _ = graph.insert_if_absent(Definition::SelfReference(SelfDefinition {
            id: resolver.container.clone(),
        }));
        for interface in &resolver.interfaces {
            let mut reference =
                ReferenceDefinition::new(interface.clone(), resolver.container.clone(), Scope::Singleton);
            reference.container_reference = true;
            let _ = graph.insert_if_absent(Definition::Reference(reference));
        }
        Self { resolver, graph }
    }

    fn resolve(
        &mut self,
        id: &Identifier,
        consumer: Option<&Identifier>,
        entry: Option<&'r EntryPoint>,
    ) -> Result<()> {
        let resolver = self.resolver;

        if let Some(existing) = self.graph.get(id) {
            if existing.needs_dependency_resolution() {
                self.resolve_dependencies(id, entry)?;
            } else {
                tracing::trace!(%id, "definition already present");
            }
            return self.check_context(id, consumer);
        }

        let file_based = match resolver.mode {
            LookupMode::Runtime => false,
            LookupMode::Compile => {
                entry.is_some_and(|e| e.is_file_based(resolver.file_based))
                    && !resolver.policy.is_excluded_from_file_placement(id)
            }
        };

        if let Some(hint) = resolver.hints.find(id) {
            let definitions = hint.to_definitions(&resolver.entry_points, &resolver.hints, id, file_based)?;
            let mut inserted = Vec::new();
            for (definition_id, mut definition) in definitions {
                if resolver.policy.is_excluded_from_file_placement(&definition_id) {
                    definition.clear_file_placement();
                }
                if self.graph.insert_if_absent(definition) {
                    tracing::debug!(id = %definition_id, via = %id, "definition created from hint");
                    inserted.push(definition_id);
                }
            }
            for definition_id in inserted.iter().filter(|i| *i != id) {
                self.resolve(definition_id, Some(id), entry)?;
            }
            self.resolve_hinted(id, consumer, entry)?;
            return self.check_context(id, consumer);
        }

        let overrides = resolver.entry_points.find(id);
        let mut class = ClassDefinition::new(id.clone(), Scope::Singleton)
            .entry_point(overrides.is_some())
            .file_based(file_based);
        if let Some(entry_point) = overrides {
            class = class.with_overrides(&entry_point.parameters, &entry_point.fields);
        }
        let _ = self.graph.insert_if_absent(Definition::Class(class));
        tracing::debug!(%id, file_based, "class definition created");
        self.resolve_dependencies(id, entry)
    }

    /// Resolves what a hinted non-class definition points at.
    fn resolve_hinted(
        &mut self,
        id: &Identifier,
        consumer: Option<&Identifier>,
        entry: Option<&'r EntryPoint>,
    ) -> Result<()> {
        let (is_class, singleton, dependencies) = match self.graph.get(id) {
            Some(definition) => (
                matches!(definition, Definition::Class(_)),
                definition.scope().is_singleton(),
                definition.class_dependencies(),
            ),
            None => return Ok(()),
        };
        if is_class {
            return self.resolve(id, consumer, entry);
        }

        for dependency in &dependencies {
            self.resolve(dependency, Some(id), entry)?;
        }
        // An entry point reached directly counts as a consumer of its own target.
        if consumer.is_none() {
            if let Some(target) = self.forward_target(id, id) {
                self.record_reference(&target, id, singleton);
            }
        }
        Ok(())
    }

    /// Fails if a context-dependent `id` has no branch for `consumer`.
    fn check_context(&self, id: &Identifier, consumer: Option<&Identifier>) -> Result<()> {
        match self.graph.get(id) {
            Some(Definition::ContextDependent(context)) if context.branch_for(consumer).is_none() => {
                Err(IronwireError::ContextDependentLookup {
                    id: id.to_string(),
                    consumer: consumer.map(ToString::to_string),
                })
            }
            _ => Ok(()),
        }
    }

    fn resolve_dependencies(&mut self, id: &Identifier, entry: Option<&'r EntryPoint>) -> Result<()> {
        let resolver = self.resolver;
        let (singleton, parameter_overrides, field_overrides) = match self.graph.get_mut(id) {
            Some(Definition::Class(class)) => {
                class.state = ResolutionState::InProgress;
                (
                    class.scope.is_singleton(),
                    class.overridden_parameters.clone(),
                    class.overridden_fields.clone(),
                )
            }
            _ => return Ok(()),
        };
        tracing::trace!(%id, "resolving dependencies");

        let source_unit = resolver.metadata.source_unit(id)?;
        let arguments = if resolver.injection.constructor {
            self.constructor_arguments(id, singleton, &parameter_overrides, entry)?
        } else {
            Vec::new()
        };
        let fields = if resolver.injection.fields {
            self.injected_fields(id, singleton, &field_overrides, entry)?
        } else {
            Vec::new()
        };

        if let Some(Definition::Class(class)) = self.graph.get_mut(id) {
            class.arguments = arguments;
            class.fields = fields;
            class.source_unit = source_unit;
            class.state = ResolutionState::Resolved;
        }
        Ok(())
    }

    fn constructor_arguments(
        &mut self,
        id: &Identifier,
        singleton: bool,
        overrides: &BTreeMap<String, OverrideValue>,
        entry: Option<&'r EntryPoint>,
    ) -> Result<Vec<ConstructorArgument>> {
        let parameters = self.resolver.metadata.constructor_parameters(id)?;
        let mut arguments = Vec::with_capacity(parameters.len());

        for (position, parameter) in parameters.into_iter().enumerate() {
            let source = if let Some(value) = overrides.get(&parameter.name) {
                ArgumentSource::from(value)
            } else if parameter.optional {
                ArgumentSource::Value(parameter.default.unwrap_or(Literal::Null))
            } else if let Some(ty) = parameter.ty {
                self.resolve(&ty, Some(id), entry)?;
                self.record_reference(&ty, id, singleton);
                ArgumentSource::Dependency(ty)
            } else {
                return Err(IronwireError::UnresolvableType {
                    class: id.to_string(),
                    member_kind: MemberKind::Parameter,
                    member: parameter.name,
                    reason: "parameter has no override, no default value and no injectable type".into(),
                });
            };
            arguments.push(ConstructorArgument {
                position,
                name: parameter.name,
                source,
            });
        }

        let known: BTreeSet<&str> = arguments.iter().map(|a| a.name.as_str()).collect();
        check_overrides(id, MemberKind::Parameter, overrides, &known)?;
        Ok(arguments)
    }

    fn injected_fields(
        &mut self,
        id: &Identifier,
        singleton: bool,
        overrides: &BTreeMap<String, OverrideValue>,
        entry: Option<&'r EntryPoint>,
    ) -> Result<Vec<InjectedField>> {
        let declared = self.resolver.metadata.injectable_fields(id)?;
        let known: BTreeSet<String> = declared.iter().map(|f| f.name.clone()).collect();
        let mut fields = Vec::new();

        for field in declared {
            let value = overrides.get(&field.name);
            if !field.inject && value.is_none() {
                continue;
            }
            if field.is_static {
                return Err(IronwireError::StaticInjection {
                    class: id.to_string(),
                    field: field.name,
                });
            }
            let source = if let Some(value) = value {
                ArgumentSource::from(value)
            } else if let Some(ty) = field.ty {
                self.resolve(&ty, Some(id), entry)?;
                self.record_reference(&ty, id, singleton);
                ArgumentSource::Dependency(ty)
            } else {
                return Err(IronwireError::UnresolvableType {
                    class: id.to_string(),
                    member_kind: MemberKind::Field,
                    member: field.name,
                    reason: "field has no override and no injectable type".into(),
                });
            };
            fields.push(InjectedField {
                name: field.name,
                source,
            });
        }

        let known: BTreeSet<&str> = known.iter().map(String::as_str).collect();
        check_overrides(id, MemberKind::Field, overrides, &known)?;
        Ok(fields)
    }

    /// Counts a reference from `consumer` on `id` and on every definition
    /// `id` forwards to for that consumer.
    fn record_reference(&mut self, id: &Identifier, consumer: &Identifier, singleton: bool) {
        let mut seen = BTreeSet::new();
        let mut current = Some(id.clone());
        while let Some(target) = current {
            if !seen.insert(target.clone()) {
                break;
            }
            self.graph.increase_reference_count(&target, consumer, singleton);
            current = self.forward_target(&target, consumer);
        }
    }

    /// The identifier a reference or context-dependent definition builds for `consumer`.
    fn forward_target(&self, id: &Identifier, consumer: &Identifier) -> Option<Identifier> {
        let branch_target = |definition: &Definition| match definition {
            Definition::Reference(reference) if !reference.container_reference => {
                Some(reference.target.clone())
            }
            _ => None,
        };
        match self.graph.get(id)? {
            Definition::ContextDependent(context) => context.branch_for(Some(consumer)).and_then(branch_target),
            other => branch_target(other),
        }
    }

    fn finish(mut self) -> Result<DefinitionGraph> {
        let resolver = self.resolver;
        let mut always_activated = Vec::new();
        for id in resolver.policy.always_autoloaded() {
            if let Some(unit) = resolver.metadata.source_unit(id)? {
                if !always_activated.contains(&unit) {
                    always_activated.push(unit);
                }
            }
        }

        for entry in resolver.entry_points.iter() {
            for id in &entry.ids {
                if resolver.policy.wraps(id, entry.autoload) && self.graph.wrap_autoloaded(id, &always_activated) {
                    tracing::debug!(%id, "entry point wrapped for autoload");
                }
            }
        }
        Ok(self.graph)
    }
}

fn check_overrides(
    id: &Identifier,
    member_kind: MemberKind,
    overrides: &BTreeMap<String, OverrideValue>,
    known: &BTreeSet<&str>,
) -> Result<()> {
    let names: Vec<String> = overrides
        .keys()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();
    if names.is_empty() {
        return Ok(());
    }
    Err(IronwireError::InvalidOverride {
        class: id.to_string(),
        member_kind,
        names,
    })
}
