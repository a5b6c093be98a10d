//! Graph Fields
//!
//! This module defines the vertex types of the dependency graph: field names,
//! their dense ids, and their classification.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of a declared field.
///
/// Names are shared strings, so cloning one is a reference-count bump. Every
/// graph, record and error that mentions a field holds the same allocation
/// that was created when the field was declared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(Arc<str>);

impl FieldName {
    /// Create a field name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl PartialEq<str> for FieldName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for FieldName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Dense identifier of a field within one record type.
///
/// Ids are assigned in declaration order, starting at zero, so they double
/// as indexes into a record's value slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u32);

impl FieldId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the declaration index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of a field in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A directly assigned field. Inputs are the roots of the graph.
    Input,

    /// A field whose value is derived from other fields by a computation.
    Computed,
}

/// A vertex of the dependency graph.
#[derive(Debug, Clone)]
pub struct Field {
    name: FieldName,
    id: FieldId,

    /// Index into the graph's computation list, if the field is computed.
    computation: Option<usize>,

    /// Whether callers must supply the field on create.
    required: bool,

    /// Computations that read this field, in declaration order.
    dependents: Vec<usize>,
}

impl Field {
    pub(crate) fn new(name: FieldName, id: FieldId) -> Self {
        Self {
            name,
            id,
            computation: None,
            required: false,
            dependents: Vec::new(),
        }
    }

    /// Get the field's name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Get the field's id.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Get the field's kind.
    pub fn kind(&self) -> FieldKind {
        match self.computation {
            Some(_) => FieldKind::Computed,
            None => FieldKind::Input,
        }
    }

    /// Check if the field is computed.
    pub fn is_computed(&self) -> bool {
        self.computation.is_some()
    }

    /// Check if the field must be supplied on create.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Get the index of the field's computation, if any.
    pub fn computation(&self) -> Option<usize> {
        self.computation
    }

    /// Get the computations that depend on this field.
    pub fn dependents(&self) -> &[usize] {
        &self.dependents
    }

    pub(crate) fn set_computation(&mut self, index: usize) {
        self.computation = Some(index);
    }

    pub(crate) fn mark_required(&mut self) {
        self.required = true;
    }

    pub(crate) fn add_dependent(&mut self, index: usize) {
        if !self.dependents.contains(&index) {
            self.dependents.push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn field_names_compare_by_content() {
        let a = FieldName::new("total");
        let b = FieldName::from(String::from("total"));
        assert_eq!(a, b);
        assert_eq!(a, "total");
        assert_eq!(a.to_string(), "total");
        assert_eq!(format!("{:?}", a), "\"total\"");
    }

    #[test]
    fn field_names_look_up_by_str() {
        let mut map = HashMap::new();
        map.insert(FieldName::new("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn field_names_serialize_as_plain_strings() {
        let name = FieldName::new("subtotal");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"subtotal\"");

        let back: FieldName = serde_json::from_str("\"subtotal\"").unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn field_starts_as_input() {
        let mut field = Field::new(FieldName::new("sum"), FieldId::new(2));
        assert_eq!(field.kind(), FieldKind::Input);
        assert_eq!(field.id().index(), 2);

        field.set_computation(0);
        assert_eq!(field.kind(), FieldKind::Computed);
        assert_eq!(field.computation(), Some(0));
    }

    #[test]
    fn dependents_are_deduplicated() {
        let mut field = Field::new(FieldName::new("a"), FieldId::new(0));
        field.add_dependent(3);
        field.add_dependent(1);
        field.add_dependent(3);
        assert_eq!(field.dependents(), &[3, 1]);
    }
}
