//! Factory bodies and construction expressions.

use std::collections::BTreeSet;

use ironwire_common::error::{IronwireError, Result};
use ironwire_common::types::Identifier;
use ironwire_core::definition::{ArgumentSource, ClassDefinition, Definition};

use super::Emitter;
use crate::naming::{artifact_file, factory_name};
use crate::writer::indent;

/// File the generated code is written into; decides `include!` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Site {
    /// The main container artifact.
    Main,
    /// An artifact in the definition directory.
    Definitions,
}

/// What a dependency expression ends up building.
enum Target<'g> {
    /// The container itself.
    Container,
    /// The factory of a class or autoloaded definition.
    Factory(&'g Identifier),
}

/// Return type of the factory of `definition`.
pub(super) fn return_type(definition: &Definition) -> String {
    match definition {
        Definition::Class(class) => format!("Arc<{}>", class.id),
        Definition::Reference(reference) => format!("Arc<dyn {}>", reference.id),
        Definition::ContextDependent(context) => format!("Arc<dyn {}>", context.id),
        Definition::SelfReference(_) => "Arc<Self>".to_owned(),
        Definition::Autoloaded(autoloaded) => return_type(&autoloaded.inner),
    }
}

impl<'g> Emitter<'g> {
    /// Expression building `definition`, written for `site`.
    pub(super) fn definition_body(&self, definition: &'g Definition, site: Site) -> Result<String> {
        match definition {
            Definition::Class(class) => self.class_body(class, site),
            Definition::Reference(reference) if reference.container_reference => {
                Ok("Arc::clone(self)".to_owned())
            }
            Definition::Reference(reference) => self.target_expr(&reference.target, Some(&reference.id), site),
            Definition::ContextDependent(_) => self.target_expr(definition.id(), None, site),
            Definition::SelfReference(_) => Ok("Arc::clone(self)".to_owned()),
            Definition::Autoloaded(autoloaded) => self.definition_body(&autoloaded.inner, site),
        }
    }

    fn class_body(&self, class: &'g ClassDefinition, site: Site) -> Result<String> {
        let arguments = class
            .arguments
            .iter()
            .map(|argument| self.source_expr(&argument.source, &class.id, site))
            .collect::<Result<Vec<_>>>()?;
        let constructor = format!("{}::new({})", class.id, arguments.join(", "));

        let construction = if class.fields.is_empty() {
            format!("Arc::new({constructor})")
        } else {
            let mut lines = vec![format!("let mut entry = {constructor};")];
            for field in &class.fields {
                let value = self.source_expr(&field.source, &class.id, site)?;
                lines.push(format!("entry.{} = {value};", field.name));
            }
            lines.push("Arc::new(entry)".to_owned());
            format!("{{\n{}\n}}", indent(&lines.join("\n")))
        };

        if !self.graph.is_cached(&class.id) {
            return Ok(construction);
        }
        let cache = factory_name(&class.id);
        Ok(format!("self.{cache}.get_or_init(|| {construction}).clone()"))
    }

    fn source_expr(&self, source: &'g ArgumentSource, consumer: &Identifier, site: Site) -> Result<String> {
        match source {
            ArgumentSource::Dependency(id) => self.target_expr(id, Some(consumer), site),
            ArgumentSource::Value(literal) => Ok(literal.to_rust()),
            ArgumentSource::Reference(path) => Ok(path.clone()),
        }
    }

    /// Expression yielding the instance behind `id` for `consumer`.
    pub(super) fn target_expr(&self, id: &'g Identifier, consumer: Option<&Identifier>, site: Site) -> Result<String> {
        match self.resolve_target(id, consumer)? {
            Target::Container => Ok("Arc::clone(self)".to_owned()),
            Target::Factory(target) => Ok(self.call_expr(target, site)),
        }
    }

    /// Follows references and context-dependent branches to what is built.
    fn resolve_target(&self, id: &'g Identifier, consumer: Option<&Identifier>) -> Result<Target<'g>> {
        let mut seen = BTreeSet::new();
        let mut current = id;
        loop {
            if !seen.insert(current) {
                return Err(IronwireError::Config {
                    message: format!("reference cycle through \"{current}\""),
                });
            }
            let definition = self.graph.get(current).ok_or_else(|| IronwireError::NotFound {
                kind: "definition",
                id: current.to_string(),
            })?;
            current = match definition {
                Definition::SelfReference(_) => return Ok(Target::Container),
                Definition::Reference(reference) if reference.container_reference => {
                    return Ok(Target::Container);
                }
                Definition::Reference(reference) => &reference.target,
                Definition::ContextDependent(context) => {
                    let branch = context.branch_for(consumer).ok_or_else(|| {
                        IronwireError::ContextDependentLookup {
                            id: current.to_string(),
                            consumer: consumer.map(ToString::to_string),
                        }
                    })?;
                    match branch {
                        Definition::Reference(reference) if reference.container_reference => {
                            return Ok(Target::Container);
                        }
                        Definition::Reference(reference) => &reference.target,
                        other => other.id(),
                    }
                }
                Definition::Class(_) | Definition::Autoloaded(_) => return Ok(Target::Factory(current)),
            };
        }
    }

    /// Call of the factory of `id`, read from its cache first when it has one.
    fn call_expr(&self, id: &Identifier, site: Site) -> String {
        let factory = factory_name(id);
        let inline_only = matches!(
            self.graph.get(id),
            Some(Definition::Class(class)) if class.file_based && !class.entry_point
        );
        let call = if inline_only {
            self.include(site, &artifact_file(&factory))
        } else {
            format!("self.{factory}()")
        };
        if self.graph.is_cached(id) {
            format!("self.{factory}.get().cloned().unwrap_or_else(|| {call})")
        } else {
            call
        }
    }
}
