//! Identifiers exposed as public retrieval methods of the container.

use std::collections::{BTreeMap, HashSet};

use ironwire_common::config::{EntryPointConfig, EntryPointTarget, OverrideValue};
use ironwire_common::error::{IronwireError, Result};
use ironwire_common::types::Identifier;

use crate::metadata::MetadataProvider;

/// One declared entry point, expanded to the identifiers it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPoint {
    /// Covered identifiers, in expansion order.
    pub ids: Vec<Identifier>,
    /// Definitions reached from this entry point are placed in separate files.
    pub file_based: bool,
    /// Covered identifiers get an autoload proxy.
    pub autoload: bool,
    /// Constructor parameter overrides of the covered identifiers.
    pub parameters: BTreeMap<String, OverrideValue>,
    /// Field overrides of the covered identifiers.
    pub fields: BTreeMap<String, OverrideValue>,
}

impl EntryPoint {
    /// Expands a declaration against the identifiers known to `metadata`.
    ///
    /// # Errors
    ///
    /// Returns an error if a namespace prefix is empty.
    pub fn from_config(config: &EntryPointConfig, metadata: &dyn MetadataProvider) -> Result<Self> {
        let ids = match &config.target {
            EntryPointTarget::Class { class } => vec![class.clone()],
            EntryPointTarget::Namespace {
                namespace,
                recursive,
                only_concrete,
            } => expand_namespace(namespace, *recursive, *only_concrete, metadata)?,
        };
        Ok(Self {
            ids,
            file_based: config.file_based,
            autoload: config.autoload,
            parameters: config.parameters.clone(),
            fields: config.fields.clone(),
        })
    }

    /// Whether definitions reached from this entry point are file-based.
    #[must_use]
    pub const fn is_file_based(&self, globally_enabled: bool) -> bool {
        self.file_based || globally_enabled
    }
}

fn expand_namespace(
    namespace: &str,
    recursive: bool,
    only_concrete: bool,
    metadata: &dyn MetadataProvider,
) -> Result<Vec<Identifier>> {
    let prefix = namespace.trim_end_matches("::");
    if prefix.is_empty() {
        return Err(IronwireError::Config {
            message: "namespace entry point has an empty prefix".into(),
        });
    }
    let prefix = format!("{prefix}::");

    let mut ids: Vec<Identifier> = metadata
        .identifiers()
        .into_iter()
        .filter(|id| {
            id.as_str()
                .strip_prefix(&prefix)
                .is_some_and(|rest| !rest.is_empty() && (recursive || !rest.contains("::")))
        })
        .filter(|id| !only_concrete || metadata.is_concrete(id))
        .collect();
    ids.sort();
    tracing::debug!(namespace, count = ids.len(), "expanded namespace entry point");
    Ok(ids)
}

/// The ordered set of entry points of one compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPoints {
    entries: Vec<EntryPoint>,
}

impl EntryPoints {
    /// Wraps already expanded entry points.
    #[must_use]
    pub const fn new(entries: Vec<EntryPoint>) -> Self {
        Self { entries }
    }

    /// Expands every declaration in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a declaration cannot be expanded.
    pub fn from_config(configs: &[EntryPointConfig], metadata: &dyn MetadataProvider) -> Result<Self> {
        let entries = configs
            .iter()
            .map(|config| EntryPoint::from_config(config, metadata))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Iterates entry points in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.iter()
    }

    /// Every covered identifier in declared order, without duplicates.
    #[must_use]
    pub fn identifiers(&self) -> Vec<Identifier> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|entry| entry.ids.iter())
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }

    /// The first entry point covering `id`.
    #[must_use]
    pub fn find(&self, id: &Identifier) -> Option<&EntryPoint> {
        self.entries.iter().find(|entry| entry.ids.contains(id))
    }

    /// Whether `id` is a declared entry point.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.find(id).is_some()
    }
}
