//! Attribute Validation
//!
//! Validation runs before any value is written. It sees the record type's
//! graph, which tells it every declared field, whether each one is input or
//! computed, and which inputs are required.
//!
//! Inputs are required when they are marked so explicitly, or when some
//! computation reads them.

use crate::error::ValidationError;
use crate::graph::{DependencyGraph, FieldName};
use crate::record::Attrs;

/// Validates attributes before `create` and `update` apply them.
///
/// Errors are passed to the caller unchanged, wrapped in
/// `RecordError::Validation`.
pub trait Validate<V>: Send + Sync {
    /// Check the attributes of a new record.
    fn validate_create(
        &self,
        graph: &DependencyGraph<V>,
        attrs: &Attrs<V>,
    ) -> Result<(), ValidationError>;

    /// Check the changes applied to an existing record.
    fn validate_update(
        &self,
        graph: &DependencyGraph<V>,
        changes: &Attrs<V>,
    ) -> Result<(), ValidationError>;
}

/// Rejects unknown fields, and missing required fields on create.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl Strict {
    fn known_fields<V>(
        graph: &DependencyGraph<V>,
        attrs: &Attrs<V>,
    ) -> Result<(), ValidationError> {
        match attrs.keys().find(|key| graph.field(key).is_none()) {
            Some(key) => Err(ValidationError::UnknownField(key.to_string())),
            None => Ok(()),
        }
    }
}

impl<V> Validate<V> for Strict {
    fn validate_create(
        &self,
        graph: &DependencyGraph<V>,
        attrs: &Attrs<V>,
    ) -> Result<(), ValidationError> {
        Self::known_fields(graph, attrs)?;

        let missing: Vec<FieldName> = graph
            .required_fields()
            .filter(|field| !attrs.contains(field.name().as_str()))
            .map(|field| field.name().clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::RequiredFieldMissing(missing))
        }
    }

    fn validate_update(
        &self,
        graph: &DependencyGraph<V>,
        changes: &Attrs<V>,
    ) -> Result<(), ValidationError> {
        Self::known_fields(graph, changes)
    }
}

/// Accepts everything.
///
/// Missing fields are left absent. Unknown fields are still rejected when
/// the record is built, since there is nowhere to store them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl<V> Validate<V> for Permissive {
    fn validate_create(&self, _: &DependencyGraph<V>, _: &Attrs<V>) -> Result<(), ValidationError> {
        Ok(())
    }

    fn validate_update(&self, _: &DependencyGraph<V>, _: &Attrs<V>) -> Result<(), ValidationError> {
        Ok(())
    }
}
