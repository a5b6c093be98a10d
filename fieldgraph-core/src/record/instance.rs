//! Record Instances
//!
//! A record holds one value slot per declared field of its type. Records are
//! values: nothing mutates one after it is built, and every update returns a
//! new record while the old one stays valid.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::attrs::Attrs;
use super::schema::Schema;
use crate::error::RecordError;
use crate::graph::{FieldId, FieldName};

/// An immutable record of a given [`Schema`].
pub struct Record<V> {
    schema: Arc<Schema<V>>,

    /// One slot per field, indexed by `FieldId`. `None` means absent.
    values: Vec<Option<V>>,
}

impl<V> Record<V> {
    pub(crate) fn from_parts(schema: Arc<Schema<V>>, values: Vec<Option<V>>) -> Self {
        debug_assert_eq!(values.len(), schema.graph().len());
        Self { schema, values }
    }

    pub(crate) fn values(&self) -> &[Option<V>] {
        &self.values
    }

    /// Get the record's type.
    pub fn schema(&self) -> &Arc<Schema<V>> {
        &self.schema
    }

    /// Get a field's value, or `None` if it is absent or not declared.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.schema
            .graph()
            .field_id(name)
            .and_then(|id| self.get_by_id(id))
    }

    /// Get a field's value by id.
    pub fn get_by_id(&self, id: FieldId) -> Option<&V> {
        self.values.get(id.index()).and_then(Option::as_ref)
    }

    /// Check if a field holds a value.
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over every declared field and its value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, Option<&V>)> {
        self.schema
            .graph()
            .fields()
            .map(|field| (field.name(), self.values[field.id().index()].as_ref()))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record's type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Clone> Record<V> {
    /// Apply changes, returning the updated record.
    ///
    /// See [`Schema::update`].
    pub fn update<I, K>(&self, changes: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        self.schema.update(self, changes)
    }

    /// Set one field, returning the updated record.
    ///
    /// See [`Schema::put`].
    pub fn put(&self, field: &str, value: V) -> Result<Self, RecordError> {
        self.schema.put(self, field, value)
    }

    /// Recompute every computed field.
    ///
    /// See [`Schema::refresh`].
    pub fn refresh(&self) -> Result<Self, RecordError> {
        self.schema.refresh(self)
    }

    /// Collect the present values as attributes.
    pub fn to_attrs(&self) -> Attrs<V> {
        self.iter()
            .filter_map(|(name, value)| value.map(|value| (name, value.clone())))
            .collect()
    }
}

impl<V: Clone> Clone for Record<V> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            values: self.values.clone(),
        }
    }
}

impl<V: PartialEq> PartialEq for Record<V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.values == other.values
    }
}

impl<V: fmt::Debug> fmt::Debug for Record<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.schema.name())?;
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: Serialize> Serialize for Record<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
