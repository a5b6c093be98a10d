//! Recompute Executor
//!
//! Runs an ordered list of computations against a record's value slots.
//!
//! Each computation reads its dependencies as they stand after every earlier
//! computation of the same pass, so a chain settles in a single walk. The
//! slots are taken by value and only handed back when every computation
//! succeeded: a failing body leaves nothing half-written behind.

use tracing::trace;

use crate::error::RecordError;
use crate::graph::{DependencyGraph, Inputs};

/// Apply the computations at `order` to `values`.
///
/// `order` must be a dependency order of computation indexes, as produced by
/// [`DependencyGraph::topological_order`]. Slots outside it are carried over.
///
/// # Errors
///
/// Returns `RecordError::Computation` for the first body that fails.
pub(crate) fn recompute<V>(
    graph: &DependencyGraph<V>,
    mut values: Vec<Option<V>>,
    order: &[usize],
) -> Result<Vec<Option<V>>, RecordError> {
    for &index in order {
        let computation = &graph.computations()[index];

        let value = {
            let inputs = Inputs::new(
                computation.deps(),
                computation
                    .dep_ids()
                    .iter()
                    .map(|dep| values[dep.index()].as_ref())
                    .collect(),
            );

            trace!(
                field = %computation.field(),
                arity = computation.arity(),
                "evaluating computation"
            );

            computation
                .evaluate(&inputs)
                .map_err(|source| RecordError::Computation {
                    field: computation.field().clone(),
                    source,
                })?
        };

        values[computation.id().index()] = Some(value);
    }

    Ok(values)
}
