//! Attribute Normalization
//!
//! Callers hand attributes over as pair lists, arrays or maps of any kind.
//! All of them are normalized into [`Attrs`] before a record is touched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field assignments, in the order they were supplied.
///
/// A key that appears twice keeps its first position and takes the last
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs<V>(IndexMap<String, V>);

impl<V> Attrs<V> {
    /// Create an empty set of attributes.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Assign `value` to `key`, replacing any earlier value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: V) {
        let key = key.as_ref();
        match self.0.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.0.insert(key.to_string(), value);
            }
        }
    }

    /// Get the value assigned to `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    /// Check if `key` is assigned.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over the assigned keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over the assignments.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for Attrs<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Attrs<V>
where
    K: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}

impl<V> IntoIterator for Attrs<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
