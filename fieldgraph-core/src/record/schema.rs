//! Record Schemas
//!
//! A schema is a frozen record type: its dependency graph, its options and
//! its validator. Schemas are shared behind an `Arc` by every record of the
//! type and are never modified.
//!
//! # Update Protocol
//!
//! - `create` builds a record from attributes and computes every computed
//!   field in dependency order.
//! - `update` writes the changes, then recomputes only the computed fields
//!   downstream of them.
//! - `put` is `update` with a single change.
//!
//! Each call either returns a complete new record or fails without side
//! effects. Unless the type allows it, assigning a computed field fails.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::attrs::Attrs;
use super::builder::SchemaBuilder;
use super::executor;
use super::instance::Record;
use super::options::SchemaOptions;
use crate::diagram::Diagram;
use crate::error::{RecordError, ValidationError};
use crate::graph::{DependencyGraph, Field, FieldId, FieldName};
use crate::validate::Validate;

/// A frozen record type.
pub struct Schema<V> {
    name: String,
    graph: DependencyGraph<V>,
    options: SchemaOptions,
    validator: Box<dyn Validate<V>>,
}

impl<V> Schema<V> {
    /// Start defining a record type.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder<V> {
        SchemaBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: String,
        graph: DependencyGraph<V>,
        options: SchemaOptions,
        validator: Box<dyn Validate<V>>,
    ) -> Self {
        Self {
            name,
            graph,
            options,
            validator,
        }
    }

    /// Get the record type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the dependency graph.
    pub fn graph(&self) -> &DependencyGraph<V> {
        &self.graph
    }

    /// Get the options.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Render the dependency graph as a Mermaid flowchart.
    pub fn diagram(&self) -> Diagram<'_, V> {
        Diagram::new(&self.name, &self.graph)
    }

    /// Reject assignments to computed fields unless the type allows them.
    fn check_assignment(&self, attrs: &Attrs<V>) -> Result<(), RecordError> {
        if self.options.allow_set_computed {
            return Ok(());
        }

        let fields: Vec<FieldName> = attrs
            .keys()
            .filter_map(|key| self.graph.field(key))
            .filter(|field| field.is_computed())
            .map(|field| field.name().clone())
            .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(RecordError::ComputedFieldAssignment { fields })
        }
    }

    /// Resolve attribute keys to field ids.
    fn resolve(&self, attrs: Attrs<V>) -> Result<Vec<(FieldId, V)>, RecordError> {
        attrs
            .into_iter()
            .map(|(key, value)| match self.graph.field_id(&key) {
                Some(id) => Ok((id, value)),
                None => Err(ValidationError::UnknownField(key).into()),
            })
            .collect()
    }

    fn schedule(&self, subset: &[usize]) -> Result<Vec<usize>, RecordError> {
        self.graph
            .topological_order(subset)
            .map_err(|stalled| RecordError::Unschedulable {
                pending: stalled
                    .pending
                    .iter()
                    .map(|&index| self.graph.computations()[index].field().clone())
                    .collect(),
            })
    }

    fn check_owner(self: &Arc<Self>, record: &Record<V>) -> Result<(), RecordError> {
        if Arc::ptr_eq(self, record.schema()) {
            Ok(())
        } else {
            Err(RecordError::SchemaMismatch {
                expected: self.name.clone(),
                found: record.schema().name().to_string(),
            })
        }
    }
}

impl<V: Clone> Schema<V> {
    /// Create a record from attributes.
    ///
    /// Fields not supplied start absent. Every computed field is then
    /// computed, except computed fields the caller supplied on a type that
    /// allows it.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ComputedFieldAssignment` naming every computed
    /// field supplied on a type that forbids it, `RecordError::Validation` if
    /// the validator rejects the attributes, and `RecordError::Computation`
    /// if a computation fails.
    pub fn create<I, K>(self: &Arc<Self>, attrs: I) -> Result<Record<V>, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let attrs: Attrs<V> = attrs.into_iter().collect();
        self.check_assignment(&attrs)?;
        self.validator.validate_create(&self.graph, &attrs)?;

        let mut values: Vec<Option<V>> = vec![None; self.graph.len()];
        let mut supplied: Vec<FieldId> = Vec::new();
        for (id, value) in self.resolve(attrs)? {
            if self.graph.field_by_id(id).is_some_and(Field::is_computed) {
                supplied.push(id);
            }
            values[id.index()] = Some(value);
        }

        let order: Cow<'_, [usize]> = if supplied.is_empty() {
            Cow::Borrowed(self.graph.full_order())
        } else {
            let subset: Vec<usize> = (0..self.graph.computations().len())
                .filter(|&index| !supplied.contains(&self.graph.computations()[index].id()))
                .collect();
            Cow::Owned(self.schedule(&subset)?)
        };

        debug!(
            record = %self.name,
            overrides = supplied.len(),
            scheduled = order.len(),
            "creating record"
        );

        let values = executor::recompute(&self.graph, values, &order)?;
        Ok(Record::from_parts(Arc::clone(self), values))
    }

    /// Apply changes to a record, returning the updated record.
    ///
    /// Changed fields are written as given. Computed fields downstream of
    /// them are recomputed in dependency order; everything else is carried
    /// over. `record` itself is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::SchemaMismatch` if `record` is of another type,
    /// and otherwise the same errors as [`Schema::create`].
    pub fn update<I, K>(
        self: &Arc<Self>,
        record: &Record<V>,
        changes: I,
    ) -> Result<Record<V>, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        self.check_owner(record)?;

        let changes: Attrs<V> = changes.into_iter().collect();
        if changes.is_empty() {
            trace!(record = %self.name, "empty update");
            return Ok(record.clone());
        }

        self.check_assignment(&changes)?;
        self.validator.validate_update(&self.graph, &changes)?;

        let mut values = record.values().to_vec();
        let mut changed: Vec<FieldId> = Vec::with_capacity(changes.len());
        for (id, value) in self.resolve(changes)? {
            values[id.index()] = Some(value);
            changed.push(id);
        }

        let affected = self.graph.affected(&changed);
        let order = self.schedule(&affected)?;

        debug!(
            record = %self.name,
            changed = changed.len(),
            scheduled = order.len(),
            "updating record"
        );

        let values = executor::recompute(&self.graph, values, &order)?;
        Ok(Record::from_parts(Arc::clone(self), values))
    }

    /// Set a single field, returning the updated record.
    ///
    /// # Errors
    ///
    /// Same as [`Schema::update`].
    pub fn put(
        self: &Arc<Self>,
        record: &Record<V>,
        field: &str,
        value: V,
    ) -> Result<Record<V>, RecordError> {
        self.update(record, [(field, value)])
    }

    /// Recompute every computed field of a record from its current inputs.
    ///
    /// On a record produced by `create` or `update` without overrides, the
    /// result equals the record.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::SchemaMismatch` if `record` is of another type,
    /// and `RecordError::Computation` if a computation fails.
    pub fn refresh(self: &Arc<Self>, record: &Record<V>) -> Result<Record<V>, RecordError> {
        self.check_owner(record)?;

        let values = record.values().to_vec();
        let values = executor::recompute(&self.graph, values, self.graph.full_order())?;
        Ok(Record::from_parts(Arc::clone(self), values))
    }
}

impl<V> fmt::Debug for Schema<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("graph", &self.graph)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
