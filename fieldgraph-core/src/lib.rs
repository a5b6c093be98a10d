//! FieldGraph Core
//!
//! This crate provides records whose computed fields are derived from other
//! fields and kept up to date incrementally. It implements:
//!
//! - Record types with input and computed fields
//! - Dependency graph validation (unknown dependencies, cycles)
//! - Incremental recomputation in dependency order
//! - Immutable records with an atomic update protocol
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Fields, computations and the dependency graph between them
//! - `record`: Schemas, records and the create/update protocol
//! - `validate`: Attribute validation before any value is written
//! - `diagram`: Mermaid rendering of a record type
//! - `catalog`: Concurrent registry of named record types
//!
//! # Example
//!
//! ```rust
//! use fieldgraph_core::Schema;
//!
//! let order = Schema::<i64>::builder("Order")
//!     .fields(["price", "quantity"])
//!     .compute("subtotal", ["price", "quantity"], |inputs| {
//!         Ok(inputs.get("price")? * inputs.get("quantity")?)
//!     })
//!     .compute("total", ["subtotal"], |inputs| Ok(inputs.get("subtotal")? + 5))
//!     .build()?;
//!
//! let record = order.create([("price", 10), ("quantity", 3)])?;
//! assert_eq!(record.get("total"), Some(&35));
//!
//! // Only fields downstream of the change are recomputed
//! let record = record.put("quantity", 4)?;
//! assert_eq!(record.get("subtotal"), Some(&40));
//! assert_eq!(record.get("total"), Some(&45));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod diagram;
pub mod error;
pub mod graph;
pub mod record;
pub mod validate;

pub use catalog::Catalog;
pub use diagram::Diagram;
pub use error::{ComputeError, RecordError, SchemaError, ValidationError};
pub use graph::{DependencyGraph, FieldId, FieldKind, FieldName, Inputs};
pub use record::{Attrs, Record, Schema, SchemaBuilder, SchemaOptions};
pub use validate::{Permissive, Strict, Validate};
