//! Mermaid rendering of a record type's dependency graph.

use std::fmt;

use crate::graph::{DependencyGraph, FieldId};

/// A Mermaid flowchart of one record type.
///
/// Input fields are drawn as rectangles and computed fields as rounded
/// nodes, in declaration order. Edges point from a dependency to the field
/// computed from it.
pub struct Diagram<'a, V> {
    name: &'a str,
    graph: &'a DependencyGraph<V>,
}

impl<'a, V> Diagram<'a, V> {
    pub(crate) fn new(name: &'a str, graph: &'a DependencyGraph<V>) -> Self {
        Self { name, graph }
    }

    fn node(&self, name: &str) -> Option<FieldId> {
        self.graph.field_id(name)
    }
}

impl<V> fmt::Display for Diagram<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph LR")?;
        writeln!(f, "    %% {}", self.name)?;

        for field in self.graph.fields() {
            let id = field.id().index();
            let label = field.name().as_str().replace('"', "#quot;");
            if field.is_computed() {
                writeln!(f, "    f{id}([\"{label}\"]):::computed")?;
            } else {
                writeln!(f, "    f{id}[\"{label}\"]")?;
            }
        }

        for (dep, field) in self.graph.edges() {
            if let (Some(from), Some(to)) = (self.node(dep.as_str()), self.node(field.as_str())) {
                writeln!(f, "    f{} --> f{}", from.index(), to.index())?;
            }
        }

        write!(f, "    classDef computed fill:#eef,stroke:#557")
    }
}
