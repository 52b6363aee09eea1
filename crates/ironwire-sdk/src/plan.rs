//! Flat summary of a resolved graph, as shown by `iwc plan`.

use ironwire_common::types::{Identifier, Scope};
use ironwire_compiler::emitter::has_method;
use ironwire_compiler::naming::factory_name;
use ironwire_core::graph::DefinitionGraph;
use serde::Serialize;

/// One definition of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Identifier built.
    pub id: Identifier,
    /// Definition variant.
    pub kind: &'static str,
    /// Declared lifecycle.
    pub scope: Scope,
    /// Exposed publicly.
    pub entry_point: bool,
    /// Built once and cached.
    pub cached: bool,
    /// Body placed in a separate artifact.
    pub file_based: bool,
    /// Generated factory name.
    pub factory: String,
    /// The container has a method for it; otherwise consumers build it inline.
    pub method: bool,
    /// Direct class dependencies, sorted.
    pub dependencies: Vec<Identifier>,
    /// Number of distinct consumers.
    pub referrers: usize,
}

/// Definitions in emission order: entry points first, then by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Plan entries.
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    /// Summarizes `graph`.
    #[must_use]
    pub fn from_graph(graph: &DefinitionGraph) -> Self {
        let entries = graph
            .emission_order()
            .into_iter()
            .map(|definition| PlanEntry {
                id: definition.id().clone(),
                kind: definition.kind(),
                scope: definition.scope(),
                entry_point: definition.is_entry_point(),
                cached: graph.is_cached(definition.id()),
                file_based: definition.is_file_based(),
                factory: factory_name(definition.id()),
                method: has_method(definition),
                dependencies: definition.class_dependencies().into_iter().collect(),
                referrers: definition.referrers().map_or(0, |r| r.len()),
            })
            .collect();
        Self { entries }
    }

    /// Entries exposed publicly.
    pub fn entry_points(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|entry| entry.entry_point)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the plan has no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with the given definition variant.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a PlanEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }
}
