//! Schema Builder
//!
//! The builder is the registry of one record type: fields, required marks
//! and computations are collected here and validated together by
//! [`SchemaBuilder::build`]. The builder is consumed by `build`, so nothing
//! can be registered once records of the type exist.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::options::SchemaOptions;
use super::schema::Schema;
use crate::error::{ComputeError, SchemaError};
use crate::graph::{DependencyGraph, FieldName, Inputs, Registration};
use crate::validate::{Strict, Validate};

/// Fluent builder for a record type.
///
/// # Example
///
/// ```rust
/// use fieldgraph_core::Schema;
///
/// let totals = Schema::<i64>::builder("Totals")
///     .field("a")
///     .field("b")
///     .compute("sum", ["a", "b"], |inputs| Ok(inputs.get("a")? + inputs.get("b")?))
///     .build()?;
///
/// let record = totals.create([("a", 1), ("b", 2)])?;
/// assert_eq!(record.get("sum"), Some(&3));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SchemaBuilder<V> {
    name: String,
    fields: Vec<FieldName>,
    registrations: Vec<Registration<V>>,
    required: Vec<FieldName>,
    options: SchemaOptions,
    validator: Box<dyn Validate<V>>,
}

impl<V> SchemaBuilder<V> {
    /// Start a record type called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            registrations: Vec::new(),
            required: Vec::new(),
            options: SchemaOptions::default(),
            validator: Box::new(Strict),
        }
    }

    /// Get the record type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a field.
    ///
    /// Fields without a computation are inputs. Declaring a field after
    /// registering its computation counts as a second declaration.
    pub fn field(mut self, name: impl Into<FieldName>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Declare several fields.
    pub fn fields<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        self.fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Mark an input field as required on create.
    ///
    /// Inputs read by a computation are required without being marked.
    pub fn required(mut self, name: impl Into<FieldName>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Register the computation of `field` from `deps`.
    ///
    /// Declares `field` if it was not declared yet. `body` only ever sees
    /// the fields listed in `deps`.
    pub fn compute<I, N, F>(mut self, field: impl Into<FieldName>, deps: I, body: F) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
        F: Fn(&Inputs<'_, V>) -> Result<V, ComputeError> + Send + Sync + 'static,
    {
        let field = field.into();
        if !self.fields.contains(&field) {
            self.fields.push(field.clone());
        }
        self.registrations.push(Registration::new(field, deps, body));
        self
    }

    /// Replace the options.
    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }

    /// Allow or forbid direct assignment of computed fields.
    pub fn allow_set_computed(mut self, allow: bool) -> Self {
        self.options.allow_set_computed = allow;
        self
    }

    /// Older name of [`SchemaBuilder::allow_set_computed`].
    pub fn allow_update_computed(self, allow: bool) -> Self {
        self.allow_set_computed(allow)
    }

    /// Replace the validator. Defaults to [`Strict`].
    pub fn validator(mut self, validator: impl Validate<V> + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Validate the declarations and freeze the record type.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if a field is declared twice, a field has two
    /// computations, a computation reads an undeclared field, a required mark
    /// does not name an input, or the dependencies form a cycle.
    pub fn build(self) -> Result<Arc<Schema<V>>, SchemaError> {
        let graph = DependencyGraph::build(self.fields, self.registrations, self.required)?;

        debug!(
            record = %self.name,
            fields = graph.len(),
            computations = graph.computations().len(),
            "record type defined"
        );

        Ok(Arc::new(Schema::from_parts(
            self.name,
            graph,
            self.options,
            self.validator,
        )))
    }
}

impl<V> fmt::Debug for SchemaBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field(
                "computations",
                &self
                    .registrations
                    .iter()
                    .map(Registration::field)
                    .collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
