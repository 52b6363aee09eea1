//! Fluent API for resolving and compiling containers.

use ironwire_common::config::{CompilerConfig, EntryPointConfig, HintConfig};
use ironwire_common::error::Result;
use ironwire_common::types::Identifier;
use ironwire_compiler::CompiledContainer;
use ironwire_core::graph::DefinitionGraph;
use ironwire_core::metadata::{MetadataProvider, StaticMetadata};
use ironwire_core::resolver::{DependencyResolver, LookupMode};

use crate::plan::Plan;

/// Builder tying a configuration and a metadata provider to the resolver
/// and the emitter.
pub struct ContainerCompiler {
    config: CompilerConfig,
    metadata: Box<dyn MetadataProvider>,
    mode: LookupMode,
}

impl std::fmt::Debug for ContainerCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerCompiler")
            .field("container", &self.config.container.name)
            .field("entry_points", &self.config.entry_points.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl ContainerCompiler {
    /// Creates a compiler over `config` with an empty metadata map.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            metadata: Box::new(StaticMetadata::new()),
            mode: LookupMode::Compile,
        }
    }

    /// Sets the metadata provider.
    #[must_use]
    pub fn metadata(mut self, provider: impl MetadataProvider + 'static) -> Self {
        self.metadata = Box::new(provider);
        self
    }

    /// Sets the lookup mode.
    #[must_use]
    pub const fn mode(mut self, mode: LookupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Declares one more class entry point.
    #[must_use]
    pub fn entry_point(mut self, id: impl Into<Identifier>) -> Self {
        self.config.entry_points.push(EntryPointConfig::class(id));
        self
    }

    /// Adds or replaces the hint of `id`.
    #[must_use]
    pub fn hint(mut self, id: impl Into<Identifier>, hint: HintConfig) -> Self {
        let _ = self.config.hints.insert(id.into(), hint);
        self
    }

    /// The configuration compiled.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Resolves every declared entry point.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error.
    pub fn resolve(&self) -> Result<DefinitionGraph> {
        self.resolver()?.resolve_all()
    }

    /// Resolves a single declared entry point.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a declared entry point or cannot be resolved.
    pub fn resolve_one(&self, id: &Identifier) -> Result<DefinitionGraph> {
        self.resolver()?.resolve_one(id)
    }

    /// Resolves every entry point and emits the container.
    ///
    /// # Errors
    ///
    /// Returns the first resolution or emission error.
    pub fn compile(&self) -> Result<CompiledContainer> {
        let graph = self.resolve()?;
        ironwire_compiler::compile(&self.config, &graph)
    }

    /// Emits a container exposing only `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a declared entry point, or the first
    /// resolution or emission error.
    pub fn compile_one(&self, id: &Identifier) -> Result<CompiledContainer> {
        let graph = self.resolve_one(id)?;
        ironwire_compiler::compile(&self.config, &graph)
    }

    /// Resolves every entry point and summarizes the graph.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error.
    pub fn plan(&self) -> Result<Plan> {
        Ok(Plan::from_graph(&self.resolve()?))
    }

    fn resolver(&self) -> Result<DependencyResolver<'_>> {
        tracing::debug!(mode = ?self.mode, "building resolver");
        Ok(DependencyResolver::new(&self.config, self.metadata.as_ref())?.with_mode(self.mode))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ironwire_common::error::IronwireError;
    use ironwire_common::types::Scope;
    use ironwire_core::metadata::{ParameterMetadata, TypeKind, TypeMetadata};

    use super::*;

    fn metadata() -> StaticMetadata {
        StaticMetadata::new()
            .with_type(
                "app::Service",
                TypeMetadata {
                    constructor: vec![ParameterMetadata::typed("repo", "app::RepositoryInterface")],
                    ..TypeMetadata::default()
                },
            )
            .with_type(
                "app::RepositoryInterface",
                TypeMetadata {
                    kind: TypeKind::Trait,
                    ..TypeMetadata::default()
                },
            )
            .with_type("app::InMemoryRepository", TypeMetadata::default())
            .with_type("app::Clock", TypeMetadata::default())
    }

    fn repository_hint() -> HintConfig {
        HintConfig::Class {
            class: Identifier::new("app::InMemoryRepository"),
            scope: Scope::Singleton,
            parameters: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn builder_declares_entry_points_and_hints() {
        let compiler = ContainerCompiler::new(CompilerConfig::default())
            .metadata(metadata())
            .entry_point("app::Service")
            .hint("app::RepositoryInterface", repository_hint());
        assert_eq!(compiler.config().entry_points.len(), 1);
        assert_eq!(compiler.config().hints.len(), 1);

        let compiled = compiler.compile().expect("compile");
        assert!(compiled.main.source.contains("pub fn app__Service(self: &Arc<Self>)"));
    }

    #[test]
    fn missing_hint_for_interface_fails() {
        let compiler = ContainerCompiler::new(CompilerConfig::default())
            .metadata(metadata())
            .entry_point("app::Service");
        assert!(compiler.compile().is_err());
    }

    #[test]
    fn compile_one_exposes_a_single_entry_point() {
        let compiler = ContainerCompiler::new(CompilerConfig::default())
            .metadata(metadata())
            .entry_point("app::Service")
            .entry_point("app::Clock")
            .hint("app::RepositoryInterface", repository_hint());
        let compiled = compiler
            .compile_one(&Identifier::new("app::Clock"))
            .expect("compile");
        assert!(compiled.main.source.contains("pub fn app__Clock("));
        assert!(!compiled.main.source.contains("app__Service"));
    }

    #[test]
    fn compile_one_rejects_undeclared_identifier() {
        let compiler = ContainerCompiler::new(CompilerConfig::default()).metadata(metadata());
        let err = compiler
            .compile_one(&Identifier::new("app::Clock"))
            .unwrap_err();
        assert!(matches!(err, IronwireError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn plan_lists_resolved_definitions() {
        let plan = ContainerCompiler::new(CompilerConfig::default())
            .metadata(metadata())
            .entry_point("app::Service")
            .hint("app::RepositoryInterface", repository_hint())
            .plan()
            .expect("plan");
        assert_eq!(plan.len(), 4);
    }
}
