//! Catalog of record types
//!
//! A concurrent registry of frozen schemas keyed by record type name. Types
//! are defined once; records are created from the shared schema afterwards.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::error::SchemaError;
use crate::record::{Schema, SchemaBuilder};

/// Named record types, safe to share between threads.
pub struct Catalog<V> {
    schemas: DashMap<String, Arc<Schema<V>>>,
}

impl<V> Catalog<V> {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            schemas: DashMap::new(),
        }
    }

    /// Build a record type and register it under its name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::AlreadyDefined` if the name is taken, and any
    /// error raised by [`SchemaBuilder::build`]. Nothing is registered on
    /// failure.
    pub fn define(&self, builder: SchemaBuilder<V>) -> Result<Arc<Schema<V>>, SchemaError> {
        match self.schemas.entry(builder.name().to_string()) {
            Entry::Occupied(entry) => Err(SchemaError::AlreadyDefined(entry.key().clone())),
            Entry::Vacant(entry) => {
                let schema = builder.build()?;
                entry.insert(Arc::clone(&schema));
                debug!(record = %schema.name(), "record type registered");
                Ok(schema)
            }
        }
    }

    /// Look up a record type.
    pub fn get(&self, name: &str) -> Option<Arc<Schema<V>>> {
        self.schemas.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a record type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Names of every registered record type, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.iter().map(|entry| entry.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered record types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if no record type is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<V> Default for Catalog<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_look_up() {
        let catalog = Catalog::<i64>::new();
        catalog
            .define(Schema::builder("Order").field("price"))
            .unwrap();
        catalog
            .define(Schema::builder("Invoice").field("amount"))
            .unwrap();

        assert_eq!(catalog.names(), vec!["Invoice", "Order"]);
        assert!(catalog.get("Order").is_some());
        assert!(catalog.get("Refund").is_none());
    }

    #[test]
    fn names_are_defined_once() {
        let catalog = Catalog::<i64>::new();
        let first = catalog.define(Schema::builder("Order").field("price")).unwrap();

        let err = catalog
            .define(Schema::builder("Order").field("total"))
            .unwrap_err();
        assert_eq!(err, SchemaError::AlreadyDefined("Order".into()));

        let kept = catalog.get("Order").unwrap();
        assert!(Arc::ptr_eq(&first, &kept));
    }

    #[test]
    fn failed_builds_register_nothing() {
        let catalog = Catalog::<i64>::new();
        let result = catalog.define(
            Schema::<i64>::builder("Broken")
                .compute("a", ["b"], |_| Ok(0))
                .compute("b", ["a"], |_| Ok(0)),
        );

        assert!(matches!(result, Err(SchemaError::CyclicDependency { .. })));
        assert!(!catalog.contains("Broken"));
        assert!(catalog.is_empty());
    }
}
