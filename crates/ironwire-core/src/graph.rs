//! The resolved definition graph.
//!
//! Holds exactly one [`Definition`] per identifier. The graph is owned by the
//! caller of a resolution pass, filled once, and then only read by the
//! compiler. Class-dependency ordering for autoload uses `petgraph`.

use std::collections::{BTreeMap, HashMap, VecDeque};

use ironwire_common::types::Identifier;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use serde::Serialize;

use crate::definition::{AutoloadedDefinition, Definition};

/// Mapping from identifier to definition, iterated in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DefinitionGraph {
    definitions: BTreeMap<Identifier, Definition>,
    #[serde(skip)]
    entry_points: Vec<Identifier>,
}

impl DefinitionGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition of `id`.
    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&Definition> {
        self.definitions.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &Identifier) -> Option<&mut Definition> {
        self.definitions.get_mut(id)
    }

    /// Returns `true` if `id` has a definition.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.definitions.contains_key(id)
    }

    /// Inserts `definition` unless its identifier is already present.
    ///
    /// Returns `true` if the definition was inserted. An existing definition is
    /// never overwritten.
    pub fn insert_if_absent(&mut self, definition: Definition) -> bool {
        let id = definition.id().clone();
        if self.definitions.contains_key(&id) {
            return false;
        }
        let _ = self.definitions.insert(id, definition);
        true
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if the graph holds no definition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates definitions in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Definition)> {
        self.definitions.iter()
    }

    /// Entry points of the pass, in declared order.
    #[must_use]
    pub fn entry_points(&self) -> &[Identifier] {
        &self.entry_points
    }

    /// Definitions in the order the container lists them: declared entry
    /// points first, then every other definition in identifier order.
    #[must_use]
    pub fn emission_order(&self) -> Vec<&Definition> {
        let declared = &self.entry_points;
        let mut order: Vec<&Definition> = declared.iter().filter_map(|id| self.get(id)).collect();
        order.extend(
            self.definitions
                .iter()
                .filter(|(id, _)| !declared.contains(id))
                .map(|(_, definition)| definition),
        );
        order
    }

    pub(crate) fn declare_entry_point(&mut self, id: &Identifier) {
        if !self.entry_points.contains(id) {
            self.entry_points.push(id.clone());
        }
    }

    /// Records a reference from `consumer` on the definition of `id`.
    pub(crate) fn increase_reference_count(
        &mut self,
        id: &Identifier,
        consumer: &Identifier,
        consumer_singleton: bool,
    ) {
        if let Some(definition) = self.definitions.get_mut(id) {
            definition.increase_reference_count(consumer, consumer_singleton);
        }
    }

    /// Wraps the definition of `id` in an autoload proxy.
    ///
    /// Returns `false` if `id` is absent, already wrapped, or not a class or
    /// reference definition.
    pub(crate) fn wrap_autoloaded(&mut self, id: &Identifier, always_activated: &[String]) -> bool {
        let Some(slot) = self.definitions.get_mut(id) else {
            return false;
        };
        if !matches!(slot, Definition::Class(_) | Definition::Reference(_)) {
            return false;
        }
        let placeholder = Definition::SelfReference(crate::definition::SelfDefinition { id: id.clone() });
        let inner = std::mem::replace(slot, placeholder);
        *slot = Definition::Autoloaded(AutoloadedDefinition {
            file_based: inner.is_file_based(),
            inner: Box::new(inner),
            always_activated: always_activated.to_vec(),
        });
        true
    }

    /// Whether the factory of `id` builds once and caches the instance.
    ///
    /// A singleton class is cached when it is an entry point or when at least
    /// one singleton consumer references it. Singletons referenced only by
    /// prototype consumers are built fresh on every retrieval.
    #[must_use]
    pub fn is_cached(&self, id: &Identifier) -> bool {
        self.definitions.get(id).is_some_and(is_cached_definition)
    }

    /// Transitive class dependencies of `id`, including `id` itself, with every
    /// dependency ordered before its dependents.
    ///
    /// Cycles are allowed; each identifier appears once.
    #[must_use]
    pub fn class_dependency_order(&self, id: &Identifier) -> Vec<Identifier> {
        if !self.contains(id) {
            return Vec::new();
        }

        let mut graph: DiGraph<Identifier, ()> = DiGraph::new();
        let mut nodes: HashMap<Identifier, NodeIndex> = HashMap::new();
        let root = graph.add_node(id.clone());
        let _ = nodes.insert(id.clone(), root);

        let mut queue = VecDeque::from([id.clone()]);
        while let Some(current) = queue.pop_front() {
            let Some(definition) = self.definitions.get(&current) else {
                continue;
            };
            let from = nodes[&current];
            // Neighbors come back in reverse insertion order and the DFS stack
            // reverses them again, so dependencies are visited in sorted order.
            for dependency in definition.class_dependencies() {
                if !self.contains(&dependency) {
                    continue;
                }
                let to = *nodes.entry(dependency.clone()).or_insert_with(|| {
                    queue.push_back(dependency.clone());
                    graph.add_node(dependency.clone())
                });
                let _ = graph.add_edge(from, to, ());
            }
        }

        let mut order = Vec::with_capacity(graph.node_count());
        let mut dfs = DfsPostOrder::new(&graph, root);
        while let Some(index) = dfs.next(&graph) {
            order.push(graph[index].clone());
        }
        order
    }
}

fn is_cached_definition(definition: &Definition) -> bool {
    match definition {
        Definition::Class(class) => {
            class.scope.is_singleton()
                && (class.entry_point || class.referrers.values().any(|r| r.singleton))
        }
        Definition::Autoloaded(autoloaded) => is_cached_definition(&autoloaded.inner),
        Definition::Reference(_) | Definition::SelfReference(_) | Definition::ContextDependent(_) => {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use ironwire_common::types::Scope;

    use super::*;
    use crate::definition::{ArgumentSource, ClassDefinition, ConstructorArgument, ReferenceDefinition};

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    fn class(name: &str, deps: &[&str]) -> Definition {
        let mut class = ClassDefinition::new(id(name), Scope::Singleton);
        class.arguments = deps
            .iter()
            .enumerate()
            .map(|(position, dep)| ConstructorArgument {
                position,
                name: format!("arg{position}"),
                source: ArgumentSource::Dependency(id(dep)),
            })
            .collect();
        Definition::Class(class)
    }

    #[test]
    fn insert_never_overwrites() {
        let mut graph = DefinitionGraph::new();
        assert!(graph.insert_if_absent(class("a", &["b"])));
        assert!(!graph.insert_if_absent(class("a", &[])));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get(&id("a")).expect("a").class_dependencies().len(), 1);
    }

    #[test]
    fn emission_order_lists_declared_entry_points_first() {
        let mut graph = DefinitionGraph::new();
        for name in ["a", "b", "c", "d"] {
            let _ = graph.insert_if_absent(class(name, &[]));
        }
        graph.declare_entry_point(&id("c"));
        graph.declare_entry_point(&id("b"));
        graph.declare_entry_point(&id("c"));

        let order: Vec<&str> = graph.emission_order().iter().map(|d| d.id().as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn dependency_order_puts_dependencies_first() {
        let mut graph = DefinitionGraph::new();
        let _ = graph.insert_if_absent(class("a", &["b", "c"]));
        let _ = graph.insert_if_absent(class("b", &["d"]));
        let _ = graph.insert_if_absent(class("c", &["d"]));
        let _ = graph.insert_if_absent(class("d", &[]));

        let order = graph.class_dependency_order(&id("a"));
        assert_eq!(order, vec![id("d"), id("b"), id("c"), id("a")]);
    }

    #[test]
    fn dependency_order_tolerates_cycles() {
        let mut graph = DefinitionGraph::new();
        let _ = graph.insert_if_absent(class("a", &["b"]));
        let _ = graph.insert_if_absent(class("b", &["a"]));

        let order = graph.class_dependency_order(&id("a"));
        assert_eq!(order, vec![id("b"), id("a")]);
    }

    #[test]
    fn dependency_order_follows_references() {
        let mut graph = DefinitionGraph::new();
        let _ = graph.insert_if_absent(class("svc", &["iface"]));
        let _ = graph.insert_if_absent(Definition::Reference(ReferenceDefinition::new(
            id("iface"),
            id("impl"),
            Scope::Singleton,
        )));
        let _ = graph.insert_if_absent(class("impl", &[]));

        let order = graph.class_dependency_order(&id("svc"));
        assert_eq!(order, vec![id("impl"), id("iface"), id("svc")]);
    }

    #[test]
    fn missing_root_has_empty_order() {
        assert!(DefinitionGraph::new().class_dependency_order(&id("x")).is_empty());
    }

    #[test]
    fn cache_requires_singleton_consumer_or_entry_point() {
        let mut graph = DefinitionGraph::new();
        let _ = graph.insert_if_absent(class("only_proto", &[]));
        let _ = graph.insert_if_absent(class("shared", &[]));
        graph.increase_reference_count(&id("only_proto"), &id("p"), false);
        graph.increase_reference_count(&id("shared"), &id("p"), false);
        graph.increase_reference_count(&id("shared"), &id("s"), true);

        assert!(!graph.is_cached(&id("only_proto")));
        assert!(graph.is_cached(&id("shared")));
        assert!(!graph.is_cached(&id("missing")));
    }

    #[test]
    fn wrap_autoloaded_keeps_identity() {
        let mut graph = DefinitionGraph::new();
        let _ = graph.insert_if_absent(class("a", &[]));
        assert!(graph.wrap_autoloaded(&id("a"), &["src/boot.rs".to_owned()]));
        assert!(!graph.wrap_autoloaded(&id("a"), &[]));
        let wrapped = graph.get(&id("a")).expect("a");
        assert_eq!(wrapped.kind(), "autoloaded");
        assert_eq!(wrapped.id().as_str(), "a");
    }
}
