//! Update Scheduler
//!
//! The scheduler decides which computations have to run after a change, and
//! in which order.
//!
//! # Algorithm
//!
//! 1. Starting from the changed fields, walk the dependents edges breadth
//!    first and collect every computation whose field is reachable.
//! 2. Sort the collected computations topologically with Kahn's algorithm,
//!    counting only the edges inside the collected set. Dependencies outside
//!    the set already hold their final value.
//! 3. When several computations are ready at once, the one registered first
//!    goes first, so the order is the same on every run.
//!
//! Computations outside the collected set are never touched.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use super::computation::DepList;
use super::dependency::DependencyGraph;
use super::field::{FieldId, FieldName};

/// Kahn's reduction ran out of ready computations before placing all of
/// them, so the remaining ones contain a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stalled {
    /// Indexes of the computations left unplaced, ascending.
    pub pending: Vec<usize>,
}

impl<V> DependencyGraph<V> {
    /// Collect the computations that must re-run when `changed` fields change.
    ///
    /// Returns computation indexes in registration order. A computed field
    /// listed in `changed` is treated as already settled: its own computation
    /// is not included, but everything downstream of it is.
    pub fn affected(&self, changed: &[FieldId]) -> Vec<usize> {
        let mut reached = vec![false; self.fields.len()];
        let mut queue = VecDeque::new();
        let mut result = Vec::new();

        for &id in changed {
            if id.index() < reached.len() && !reached[id.index()] {
                reached[id.index()] = true;
                queue.push_back(id);
            }
        }

        // BFS over dependents
        while let Some(id) = queue.pop_front() {
            for &index in self.fields[id.index()].dependents() {
                let target = self.computations[index].id();
                if !reached[target.index()] {
                    reached[target.index()] = true;
                    result.push(index);
                    queue.push_back(target);
                }
            }
        }

        result.sort_unstable();
        result
    }

    /// Put a subset of computations in dependency order.
    ///
    /// Every computation in the result comes after the computations it
    /// depends on that are also in `subset`. Duplicate and out-of-range
    /// indexes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Stalled`] if the subset contains a cycle.
    pub fn topological_order(&self, subset: &[usize]) -> Result<Vec<usize>, Stalled> {
        let mut member = vec![false; self.computations.len()];
        let mut members = Vec::with_capacity(subset.len());
        for &index in subset {
            if index < member.len() && !member[index] {
                member[index] = true;
                members.push(index);
            }
        }

        // In-degrees count only distinct dependencies inside the subset
        let mut in_degree = vec![0usize; self.computations.len()];
        let mut ready = BinaryHeap::new();
        for &index in &members {
            let mut seen: DepList<FieldId> = DepList::new();
            for &dep in self.computations[index].dep_ids() {
                if seen.contains(&dep) {
                    continue;
                }
                seen.push(dep);
                if let Some(upstream) = self.fields[dep.index()].computation() {
                    if member[upstream] {
                        in_degree[index] += 1;
                    }
                }
            }
            if in_degree[index] == 0 {
                ready.push(Reverse(index));
            }
        }

        // Kahn's algorithm
        let mut order = Vec::with_capacity(members.len());
        while let Some(Reverse(index)) = ready.pop() {
            order.push(index);
            member[index] = false;

            let field = self.computations[index].id();
            for &dependent in self.fields[field.index()].dependents() {
                if member[dependent] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        if order.len() < members.len() {
            let mut pending: Vec<usize> = members.into_iter().filter(|&i| member[i]).collect();
            pending.sort_unstable();
            return Err(Stalled { pending });
        }

        Ok(order)
    }

    /// Extract one cycle from the computations a stalled sort left behind.
    ///
    /// Starts at the first pending computation and keeps following its first
    /// pending dependency until a field repeats. The walk before the repeated
    /// field is dropped, so only the cycle itself is returned.
    pub(crate) fn find_cycle(&self, pending: &[usize]) -> Vec<FieldName> {
        let mut is_pending = vec![false; self.computations.len()];
        for &index in pending {
            is_pending[index] = true;
        }

        let mut path: Vec<usize> = Vec::new();
        let mut current = match pending.first() {
            Some(&index) => index,
            None => return Vec::new(),
        };

        loop {
            if let Some(start) = path.iter().position(|&index| index == current) {
                let mut cycle: Vec<FieldName> = path[start..]
                    .iter()
                    .map(|&index| self.computations[index].field().clone())
                    .collect();
                cycle.push(self.computations[current].field().clone());
                return cycle;
            }
            path.push(current);

            // Every stalled computation has at least one stalled dependency
            let next = self.computations[current]
                .dep_ids()
                .iter()
                .filter_map(|dep| self.fields[dep.index()].computation())
                .find(|&upstream| is_pending[upstream]);

            match next {
                Some(upstream) => current = upstream,
                None => {
                    return path
                        .iter()
                        .map(|&index| self.computations[index].field().clone())
                        .collect()
                }
            }
        }
    }
}
