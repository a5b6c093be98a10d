//! Dependency Graph
//!
//! Validates a record type's declarations and freezes them into an
//! immutable graph. Ordering and propagation live in the scheduler.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::computation::{Computation, ComputeFn, DepList, Inputs};
use super::field::{Field, FieldId, FieldName};
use crate::error::{ComputeError, SchemaError};

/// A computation as registered, before its dependencies are resolved.
pub struct Registration<V> {
    field: FieldName,
    deps: DepList<FieldName>,
    body: ComputeFn<V>,
}

impl<V> Registration<V> {
    /// Register `body` as the computation of `field`, reading `deps`.
    pub fn new<I, N, F>(field: impl Into<FieldName>, deps: I, body: F) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
        F: Fn(&Inputs<'_, V>) -> Result<V, ComputeError> + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            deps: deps.into_iter().map(Into::into).collect(),
            body: Arc::new(body),
        }
    }

    /// Get the declared dependencies.
    pub fn deps(&self) -> &[FieldName] {
        &self.deps
    }

    /// Get the name of the field being computed.
    pub fn field(&self) -> &FieldName {
        &self.field
    }
}

/// The validated dependency graph of one record type.
///
/// Vertices are the declared fields; there is an edge `dep -> field` for
/// every dependency of every computation. The graph never changes after
/// [`DependencyGraph::build`] returns.
pub struct DependencyGraph<V> {
    /// All fields in declaration order.
    pub(crate) fields: IndexMap<FieldName, Field>,

    /// All computations in registration order.
    pub(crate) computations: Vec<Computation<V>>,

    /// Every computation, in dependency order.
    pub(crate) order: Vec<usize>,
}

impl<V> DependencyGraph<V> {
    /// Validate declarations and build the graph.
    ///
    /// A computation whose field was not declared declares it, after all
    /// explicitly declared fields.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateField` if a field is declared twice.
    /// Returns `SchemaError::DuplicateComputation` if a field has two computations.
    /// Returns `SchemaError::UnknownDependency` if a computation reads an undeclared field.
    /// Returns `SchemaError::UnknownRequiredField` or `SchemaError::RequiredComputedField`
    /// if a required mark does not name an input field.
    /// Returns `SchemaError::CyclicDependency` if the dependencies form a cycle.
    pub fn build(
        fields: impl IntoIterator<Item = FieldName>,
        registrations: impl IntoIterator<Item = Registration<V>>,
        required: impl IntoIterator<Item = FieldName>,
    ) -> Result<Self, SchemaError> {
        let mut graph = Self {
            fields: IndexMap::new(),
            computations: Vec::new(),
            order: Vec::new(),
        };

        for name in fields {
            if graph.fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField(name));
            }
            graph.declare(name);
        }

        let registrations: Vec<Registration<V>> = registrations.into_iter().collect();
        for registration in &registrations {
            if !graph.fields.contains_key(&registration.field) {
                graph.declare(registration.field.clone());
            }
        }

        for registration in registrations {
            graph.register(registration)?;
        }

        for name in required {
            let field = graph
                .fields
                .get_mut(&name)
                .ok_or_else(|| SchemaError::UnknownRequiredField(name.clone()))?;
            if field.is_computed() {
                return Err(SchemaError::RequiredComputedField(name));
            }
            field.mark_required();
        }

        // Inputs that feed a computation must be supplied.
        for index in 0..graph.computations.len() {
            for dep in graph.computations[index].dep_ids().to_vec() {
                let field = &mut graph.fields[dep.index()];
                if !field.is_computed() {
                    field.mark_required();
                }
            }
        }

        let all: Vec<usize> = (0..graph.computations.len()).collect();
        graph.order = match graph.topological_order(&all) {
            Ok(order) => order,
            Err(stalled) => {
                return Err(SchemaError::CyclicDependency {
                    cycle: graph.find_cycle(&stalled.pending),
                })
            }
        };

        Ok(graph)
    }

    fn declare(&mut self, name: FieldName) {
        let id = FieldId::new(self.fields.len());
        self.fields.insert(name.clone(), Field::new(name, id));
    }

    fn register(&mut self, registration: Registration<V>) -> Result<(), SchemaError> {
        let Registration { field, deps, body } = registration;

        if !self.fields.contains_key(&field) {
            self.declare(field.clone());
        }
        let target = &self.fields[&field];
        if target.is_computed() {
            return Err(SchemaError::DuplicateComputation(field));
        }
        let id = target.id();

        let mut dep_ids: DepList<FieldId> = SmallVec::with_capacity(deps.len());
        for dep in &deps {
            let dep_id = self
                .fields
                .get(dep)
                .map(Field::id)
                .ok_or_else(|| SchemaError::UnknownDependency {
                    field: field.clone(),
                    dep: dep.clone(),
                })?;
            dep_ids.push(dep_id);
        }

        let index = self.computations.len();
        self.fields[id.index()].set_computation(index);
        for dep_id in &dep_ids {
            self.fields[dep_id.index()].add_dependent(index);
        }

        self.computations
            .push(Computation::new(field, id, deps, dep_ids, body));
        Ok(())
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Look up a field by id.
    pub fn field_by_id(&self, id: FieldId) -> Option<&Field> {
        self.fields.get_index(id.index()).map(|(_, field)| field)
    }

    /// Resolve a field name to its id.
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields.get(name).map(Field::id)
    }

    /// Check if `name` is a computed field.
    pub fn is_computed(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(Field::is_computed)
    }

    /// Iterate over the input fields.
    pub fn input_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|field| !field.is_computed())
    }

    /// Iterate over the computed fields.
    pub fn computed_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|field| field.is_computed())
    }

    /// Iterate over the fields that must be supplied on create.
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|field| field.is_required())
    }

    /// All computations in registration order.
    pub fn computations(&self) -> &[Computation<V>] {
        &self.computations
    }

    /// Get the computation that produces `name`, if it is computed.
    pub fn computation_for(&self, name: &str) -> Option<&Computation<V>> {
        self.fields
            .get(name)
            .and_then(Field::computation)
            .map(|index| &self.computations[index])
    }

    /// Indexes of every computation, in dependency order.
    pub fn full_order(&self) -> &[usize] {
        &self.order
    }

    /// Iterate over the distinct `(dependency, dependent)` edges, grouped by
    /// computation in registration order.
    pub fn edges(&self) -> impl Iterator<Item = (&FieldName, &FieldName)> {
        self.computations.iter().flat_map(|computation| {
            computation
                .deps()
                .iter()
                .enumerate()
                .filter(move |(i, dep)| !computation.deps()[..*i].contains(dep))
                .map(move |(_, dep)| (dep, computation.field()))
        })
    }
}

impl<V> fmt::Debug for DependencyGraph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("computations", &self.computations)
            .finish()
    }
}
