//! Computations
//!
//! A computation derives one field from an ordered list of other fields.
//! Bodies only ever see the values they declared, through [`Inputs`].

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::field::{FieldId, FieldName};
use crate::error::ComputeError;

/// Dependency lists are short in practice, so keep them inline.
pub(crate) type DepList<T> = SmallVec<[T; 4]>;

/// The body of a computation.
pub type ComputeFn<V> = Arc<dyn Fn(&Inputs<'_, V>) -> Result<V, ComputeError> + Send + Sync>;

/// A registered computation: the field it produces, the fields it reads,
/// and the function that maps one to the other.
pub struct Computation<V> {
    field: FieldName,
    id: FieldId,
    deps: DepList<FieldName>,
    dep_ids: DepList<FieldId>,
    body: ComputeFn<V>,
}

impl<V> Computation<V> {
    pub(crate) fn new(
        field: FieldName,
        id: FieldId,
        deps: DepList<FieldName>,
        dep_ids: DepList<FieldId>,
        body: ComputeFn<V>,
    ) -> Self {
        debug_assert_eq!(deps.len(), dep_ids.len());
        Self {
            field,
            id,
            deps,
            dep_ids,
            body,
        }
    }

    /// Get the name of the produced field.
    pub fn field(&self) -> &FieldName {
        &self.field
    }

    /// Get the id of the produced field.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Get the declared dependencies, in declaration order.
    pub fn deps(&self) -> &[FieldName] {
        &self.deps
    }

    /// Get the ids of the declared dependencies.
    pub fn dep_ids(&self) -> &[FieldId] {
        &self.dep_ids
    }

    /// Number of declared dependencies.
    pub fn arity(&self) -> usize {
        self.deps.len()
    }

    #[cfg(test)]
    pub(crate) fn body(&self) -> &ComputeFn<V> {
        &self.body
    }

    /// Run the body against the given inputs.
    pub(crate) fn evaluate(&self, inputs: &Inputs<'_, V>) -> Result<V, ComputeError> {
        (self.body)(inputs)
    }
}

impl<V> Clone for Computation<V> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            id: self.id,
            deps: self.deps.clone(),
            dep_ids: self.dep_ids.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<V> fmt::Debug for Computation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computation")
            .field("field", &self.field)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// The values a computation body is allowed to read.
///
/// Holds exactly one entry per declared dependency. An entry is `None` when
/// the dependency's slot is absent in the record.
pub struct Inputs<'a, V> {
    names: &'a [FieldName],
    values: DepList<Option<&'a V>>,
}

impl<'a, V> Inputs<'a, V> {
    pub(crate) fn new(names: &'a [FieldName], values: DepList<Option<&'a V>>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Get a dependency's value, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::UndeclaredInput`] if `name` is not a declared
    /// dependency and [`ComputeError::MissingInput`] if its value is absent.
    pub fn get(&self, name: &str) -> Result<&'a V, ComputeError> {
        let position = self
            .position(name)
            .ok_or_else(|| ComputeError::UndeclaredInput(name.to_string()))?;
        self.values[position]
            .ok_or_else(|| ComputeError::MissingInput(self.names[position].clone()))
    }

    /// Get a dependency's value, or `None` if it is absent or undeclared.
    pub fn value(&self, name: &str) -> Option<&'a V> {
        self.position(name).and_then(|position| self.values[position])
    }

    /// Get a dependency's value by its position in the declared list.
    pub fn at(&self, position: usize) -> Option<&'a V> {
        self.values.get(position).copied().flatten()
    }

    /// Iterate over the declared dependencies and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&'a FieldName, Option<&'a V>)> + '_ {
        self.names.iter().zip(self.values.iter().copied())
    }

    /// Number of declared dependencies.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the computation declared no dependencies.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|dep| dep.as_str() == name)
    }
}
