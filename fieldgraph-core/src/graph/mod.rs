//! Dependency Graph
//!
//! This module implements the graph that ties a record type's computed fields
//! to the fields they are derived from.
//!
//! # Overview
//!
//! The dependency graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are the declared fields of one record type
//! - Edges are dependencies: if `sum` is computed from `a`, there is an edge
//!   from `a` to `sum`
//!
//! When fields change, we walk the graph from the changed fields to find every
//! computed field downstream of them, then order those computations so each
//! one runs after everything it reads.
//!
//! # Design Decisions
//!
//! 1. The graph is validated and frozen once per record type. Unknown
//!    dependencies and cycles are rejected before any record exists.
//!
//! 2. Fields are indexed by dense ids assigned in declaration order, so
//!    lookups during propagation are plain vector indexing.
//!
//! 3. We keep both directions: computations know their dependencies and
//!    fields know their dependents.

mod computation;
mod dependency;
mod field;
mod scheduler;

pub use computation::{Computation, ComputeFn, Inputs};
pub use dependency::{DependencyGraph, Registration};
pub use field::{Field, FieldId, FieldKind, FieldName};
pub use scheduler::Stalled;
