//! Per-type configuration.

use serde::{Deserialize, Serialize};

/// Options fixed when a record type is defined.
///
/// Deserializes from any serde format, so host applications can keep record
/// type settings next to the rest of their configuration:
///
/// ```rust
/// use fieldgraph_core::SchemaOptions;
///
/// let options: SchemaOptions =
///     serde_json::from_str(r#"{"allow_update_computed": true}"#).unwrap();
/// assert!(options.allow_set_computed);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaOptions {
    /// Allow callers to assign computed fields directly on create and update.
    ///
    /// Assigned values are kept as-is and are not recomputed by that call.
    /// Also accepted under its older name, `allow_update_computed`.
    #[serde(alias = "allow_update_computed")]
    pub allow_set_computed: bool,
}

impl SchemaOptions {
    /// Options that permit direct assignment of computed fields.
    pub fn permissive() -> Self {
        Self {
            allow_set_computed: true,
        }
    }
}
