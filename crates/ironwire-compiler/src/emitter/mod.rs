//! Serializes a resolved [`DefinitionGraph`] into container source.
//!
//! Factories are emitted for the entry points in declared order, then for the
//! remaining definitions in identifier order. Emission only reads the graph,
//! so the same graph always yields byte-identical artifacts.

mod autoload;
mod body;

use std::collections::BTreeMap;

use ironwire_common::config::CompilerConfig;
use ironwire_common::constants::{APP_NAME, AUTOLOADED_FACTORY_SUFFIX};
use ironwire_common::error::{IronwireError, Result};
use ironwire_common::types::Identifier;
use ironwire_core::definition::Definition;
use ironwire_core::graph::DefinitionGraph;

use crate::artifact::{Artifact, CompiledContainer};
use crate::naming::{artifact_file, factory_name, type_name};
use crate::writer::{SourceWriter, indent};

use self::body::Site;

/// Compiles `graph` into the container source and its auxiliary artifacts.
///
/// # Errors
///
/// Returns [`ironwire_common::error::IronwireError::ContextDependentLookup`]
/// if a context-dependent identifier has no binding for a consumer, or an
/// error if the graph references an identifier it does not define.
pub fn compile(config: &CompilerConfig, graph: &DefinitionGraph) -> Result<CompiledContainer> {
    tracing::info!(definitions = graph.len(), "compiling container");
    let emitter = Emitter {
        graph,
        directory: config.file_based.directory.trim_end_matches('/').to_owned(),
    };
    emitter.check_member_names()?;

    let mut auxiliary = BTreeMap::new();
    let mut factories = Vec::new();
    for definition in graph.emission_order() {
        emitter.emit_definition(definition, &mut factories, &mut auxiliary)?;
    }

    let source = emitter.render(type_name(&config.container.name), &factories);
    tracing::info!(
        factories = factories.len(),
        auxiliary = auxiliary.len(),
        "container compiled"
    );
    Ok(CompiledContainer {
        main: Artifact {
            filename: config.output.container_file.clone(),
            source,
        },
        auxiliary,
    })
}

/// Whether the container impl gets a method for `definition`.
///
/// File-based classes that are not entry points only get an auxiliary
/// artifact their consumers include; non-entry aliases and context-dependent
/// identifiers resolve straight to their target; the container itself is
/// `self`.
#[must_use]
pub fn has_method(definition: &Definition) -> bool {
    match definition {
        Definition::Class(class) => class.entry_point || !class.file_based,
        Definition::Autoloaded(_) => true,
        Definition::Reference(_) | Definition::ContextDependent(_) => definition.is_entry_point(),
        Definition::SelfReference(_) => false,
    }
}

/// One method of the container impl.
struct Factory {
    name: String,
    public: bool,
    doc: String,
    return_type: String,
    body: String,
}

/// A singleton cache field.
struct Cache {
    name: String,
    ty: String,
}

pub(crate) struct Emitter<'g> {
    graph: &'g DefinitionGraph,
    directory: String,
}

/// Members of the container that no factory may shadow.
const RESERVED_MEMBERS: &[&str] = &[
    "ENTRY_POINTS",
    "new",
    "with_activator",
    "has",
    "activate",
    "activated",
    "activator",
];

impl<'g> Emitter<'g> {
    /// Fails if two identifiers map to the same method, cache field or
    /// artifact name, or one of them shadows a container member.
    fn check_member_names(&self) -> Result<()> {
        let mut owners: BTreeMap<String, &Identifier> = BTreeMap::new();
        for (id, definition) in self.graph.iter() {
            if matches!(definition, Definition::SelfReference(_)) {
                continue;
            }
            let name = factory_name(id);
            let mut names = vec![name.clone()];
            if let Definition::Autoloaded(autoloaded) = definition {
                names.push(format!("{name}{AUTOLOADED_FACTORY_SUFFIX}"));
                if autoloaded.file_based {
                    names.push(format!("{name}__proxy"));
                }
            }
            for name in names {
                if RESERVED_MEMBERS.contains(&name.as_str()) {
                    return Err(IronwireError::Config {
                        message: format!("\"{id}\" maps to the reserved container member \"{name}\""),
                    });
                }
                if let Some(other) = owners.insert(name.clone(), id) {
                    return Err(IronwireError::Config {
                        message: format!("\"{other}\" and \"{id}\" both map to the factory name \"{name}\""),
                    });
                }
            }
        }
        Ok(())
    }

    fn emit_definition(
        &self,
        definition: &'g Definition,
        factories: &mut Vec<Factory>,
        auxiliary: &mut BTreeMap<String, String>,
    ) -> Result<()> {
        let id = definition.id();
        let name = factory_name(id);
        let entry_point = definition.is_entry_point();

        match definition {
            Definition::Autoloaded(autoloaded) => {
                let inner_name = format!("{name}{AUTOLOADED_FACTORY_SUFFIX}");
                let inner_body = self.placed_body(&autoloaded.inner, &name, auxiliary)?;
                factories.push(Factory {
                    name: inner_name.clone(),
                    public: false,
                    doc: format!("Builds `{id}` without activating its source units."),
                    return_type: body::return_type(&autoloaded.inner),
                    body: inner_body,
                });

                let proxy = self.proxy_body(definition, &inner_name, &autoloaded.always_activated);
                let proxy_body = if autoloaded.file_based {
                    let file = artifact_file(&format!("{name}__proxy"));
                    let block = format!("{{\n{}\n}}", indent(&proxy));
                    let _ = auxiliary.insert(self.auxiliary_key(&file), artifact_source(id, &block));
                    self.include(Site::Main, &file)
                } else {
                    proxy
                };
                factories.push(Factory {
                    name,
                    public: true,
                    doc: format!("Activates the source units of `{id}` and builds it."),
                    return_type: body::return_type(definition),
                    body: proxy_body,
                });
                tracing::debug!(%id, "autoload proxy emitted");
                return Ok(());
            }
            Definition::Class(_) if !has_method(definition) => {
                let source = self.definition_body(definition, Site::Definitions)?;
                let _ = auxiliary.insert(
                    self.auxiliary_key(&artifact_file(&name)),
                    artifact_source(id, &source),
                );
                tracing::debug!(%id, "file-based definition emitted");
                return Ok(());
            }
            _ if !has_method(definition) => return Ok(()),
            Definition::Class(_)
            | Definition::Reference(_)
            | Definition::ContextDependent(_)
            | Definition::SelfReference(_) => {}
        }

        let body = self.placed_body(definition, &name, auxiliary)?;
        factories.push(Factory {
            name,
            public: entry_point,
            doc: format!("Returns `{id}`."),
            return_type: body::return_type(definition),
            body,
        });
        tracing::debug!(%id, kind = definition.kind(), "factory emitted");
        Ok(())
    }

    /// The method body of `definition`: inline, or an `include!` of its auxiliary artifact.
    fn placed_body(
        &self,
        definition: &'g Definition,
        name: &str,
        auxiliary: &mut BTreeMap<String, String>,
    ) -> Result<String> {
        if !definition.is_file_based() {
            return self.definition_body(definition, Site::Main);
        }
        let file = artifact_file(name);
        let source = self.definition_body(definition, Site::Definitions)?;
        let _ = auxiliary.insert(self.auxiliary_key(&file), artifact_source(definition.id(), &source));
        Ok(self.include(Site::Main, &file))
    }

    fn auxiliary_key(&self, file: &str) -> String {
        format!("{}/{file}", self.directory)
    }

    /// `include!` of an auxiliary artifact, relative to the including file.
    pub(crate) fn include(&self, site: Site, file: &str) -> String {
        match site {
            Site::Main => format!("include!(\"{}/{file}\")", self.directory),
            Site::Definitions => format!("include!(\"{file}\")"),
        }
    }

    fn caches(&self) -> Vec<Cache> {
        self.graph
            .emission_order()
            .into_iter()
            .filter(|definition| self.graph.is_cached(definition.id()))
            .map(|definition| Cache {
                name: factory_name(definition.id()),
                ty: body::return_type(definition),
            })
            .collect()
    }

    fn render(&self, container: &str, factories: &[Factory]) -> String {
        let caches = self.caches();
        let entry_points: Vec<&Identifier> = self
            .graph
            .emission_order()
            .into_iter()
            .filter(|definition| definition.is_entry_point())
            .map(Definition::id)
            .collect();

        let mut w = SourceWriter::new();
        let _ = w
            .line(&format!("// @generated by {APP_NAME}. Do not edit."))
            .line("//")
            .line(&format!(
                "// Entry points: {}. Definitions: {}.",
                entry_points.len(),
                self.graph.len()
            ))
            .blank()
            .line("use std::collections::BTreeSet;")
            .line("use std::sync::{Arc, Mutex, PoisonError};")
            .blank()
            .line("/// Dependency-injection container.")
            .line("#[allow(non_snake_case)]")
            .open(&format!("pub struct {container}"));
        for cache in &caches {
            let _ = w.line(&format!("{}: std::sync::OnceLock<{}>,", cache.name, cache.ty));
        }
        let _ = w
            .line("activated: Mutex<BTreeSet<&'static str>>,")
            .line("activator: Box<dyn Fn(&str) + Send + Sync>,")
            .close("")
            .blank()
            .line("#[allow(non_snake_case, dead_code, clippy::all)]")
            .open(&format!("impl {container}"))
            .line("/// Public identifiers and the factory building each, in declared order.")
            .open_raw("pub const ENTRY_POINTS: &'static [(&'static str, &'static str)] = &[");
        for id in &entry_points {
            let _ = w.line(&format!("({:?}, {:?}),", id.as_str(), factory_name(id)));
        }
        let _ = w
            .close_raw("];")
            .blank()
            .line("/// Creates a container whose source activations do nothing.")
            .open("pub fn new() -> Arc<Self>")
            .line("Self::with_activator(|_| {})")
            .close("")
            .blank()
            .line("/// Creates a container calling `activator` once per activated source unit.")
            .open("pub fn with_activator(activator: impl Fn(&str) + Send + Sync + 'static) -> Arc<Self>")
            .open("Arc::new(Self");
        for cache in &caches {
            let _ = w.line(&format!("{}: std::sync::OnceLock::new(),", cache.name));
        }
        let _ = w
            .line("activated: Mutex::new(BTreeSet::new()),")
            .line("activator: Box::new(activator),")
            .close(")")
            .close("")
            .blank()
            .line("/// Whether `id` is a public entry point of this container.")
            .open("pub fn has(&self, id: &str) -> bool")
            .line("Self::ENTRY_POINTS.iter().any(|(entry, _)| *entry == id)")
            .close("")
            .blank()
            .open("fn activate(&self, source: &'static str)")
            .line("let mut activated = self.activated.lock().unwrap_or_else(PoisonError::into_inner);")
            .open("if activated.insert(source)")
            .line("(self.activator)(source);")
            .close("")
            .close("");

        for factory in factories {
            let visibility = if factory.public { "pub " } else { "" };
            let _ = w
                .blank()
                .line(&format!("/// {}", factory.doc))
                .open(&format!(
                    "{visibility}fn {}(self: &Arc<Self>) -> {}",
                    factory.name, factory.return_type
                ))
                .lines(&factory.body)
                .close("");
        }
        let _ = w.close("");
        w.finish()
    }
}

fn artifact_source(id: &Identifier, body: &str) -> String {
    format!("// @generated by {APP_NAME} for `{id}`. Do not edit.\n{body}\n")
}
