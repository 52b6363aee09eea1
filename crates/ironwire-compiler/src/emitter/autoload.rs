//! Autoload proxy bodies.

use ironwire_core::definition::Definition;

use super::Emitter;

impl Emitter<'_> {
    /// Source units activated before `definition` is built: the always
    /// activated units first, then the units of its transitive class
    /// dependencies with every dependency before its dependents.
    pub(super) fn activation_units(&self, definition: &Definition, always_activated: &[String]) -> Vec<String> {
        let mut units: Vec<String> = Vec::new();
        let graph_units = self
            .graph
            .class_dependency_order(definition.id())
            .into_iter()
            .filter_map(|id| self.graph.get(&id).and_then(Definition::source_unit).map(str::to_owned));
        for unit in always_activated.iter().cloned().chain(graph_units) {
            if !units.contains(&unit) {
                units.push(unit);
            }
        }
        units
    }

    /// Statements activating every unit, then the call of `inner_factory`.
    pub(super) fn proxy_body(&self, definition: &Definition, inner_factory: &str, always_activated: &[String]) -> String {
        let mut lines: Vec<String> = self
            .activation_units(definition, always_activated)
            .iter()
            .map(|unit| format!("self.activate({unit:?});"))
            .collect();
        lines.push(format!("self.{inner_factory}()"));
        lines.join("\n")
    }
}
