//! Records
//!
//! This module holds record types and their instances.
//!
//! - [`SchemaBuilder`] collects a record type's fields and computations.
//! - [`Schema`] is the frozen type and owns the update protocol.
//! - [`Record`] is an immutable instance of a schema.
//!
//! Attributes passed to `create` and `update` are normalized into [`Attrs`]
//! before any check runs, so every entry point sees the same shape.

mod attrs;
mod builder;
mod executor;
mod instance;
mod options;
mod schema;

pub use attrs::Attrs;
pub use builder::SchemaBuilder;
pub use instance::Record;
pub use options::SchemaOptions;
pub use schema::Schema;
