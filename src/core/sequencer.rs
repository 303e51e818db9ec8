//! PP-005: Operation sequencing.
//!
//! Builds an operation-level DAG from the producer map (the producer of an
//! input runs before its consumer) and computes an execution order with
//! Kahn's algorithm. Ties are broken by the original operation order, so the
//! result is deterministic.
//!
//! Also provides an object-level ordering over the dependency edges, used as
//! diagnostic output only.

use super::graph::DependencyGraph;
use super::types::{ObjectRef, OperationList};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Compute the operation execution order.
///
/// The result is shorter than the operation list when operations depend on
/// each other circularly; callers treat that as a failed sort.
pub fn operation_order(operations: &OperationList, graph: &DependencyGraph) -> Vec<String> {
    let ops = operations.as_slice();
    let position: FxHashMap<&str, usize> = ops
        .iter()
        .enumerate()
        .map(|(idx, op)| (op.id.as_str(), idx))
        .collect();

    let mut in_degree = vec![0usize; ops.len()];
    let mut dependents: Vec<IndexSet<usize>> = vec![IndexSet::new(); ops.len()];

    // Build edges producer -> consumer, once per pair
    for (idx, op) in ops.iter().enumerate() {
        for input in &op.inputs {
            let Some(&producer) = graph.producer_of(input).and_then(|p| position.get(p)) else {
                continue;
            };
            if producer != idx && dependents[producer].insert(idx) {
                in_degree[idx] += 1;
            }
        }
    }

    // Kahn's algorithm with input-order tie-breaking
    let mut queue: VecDeque<usize> = (0..ops.len()).filter(|&i| in_degree[i] == 0).collect();

    let mut order = Vec::with_capacity(ops.len());
    while let Some(current) = queue.pop_front() {
        order.push(ops[current].id.clone());

        let mut next_ready: Vec<usize> = Vec::new();
        for &dependent in &dependents[current] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                next_ready.push(dependent);
            }
        }
        next_ready.sort_unstable();
        queue.extend(next_ready);
    }

    if order.len() != ops.len() {
        tracing::debug!(
            ordered = order.len(),
            total = ops.len(),
            "operation order incomplete"
        );
    }
    order
}

/// Object-level topological order over the dependency edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectOrder {
    /// Every object was ordered (no cycle among objects)
    pub complete: bool,

    /// Objects ordered so that each object precedes the objects it depends
    /// on. This is the reverse of execution direction: a final product comes
    /// before the reagents it is made from.
    pub objects: Vec<ObjectRef>,
}

/// Order objects along `output -> input` edges with Kahn's algorithm.
///
/// Nodes are every edge source and target, in first-seen order. An object's
/// in-degree counts the products that depend on it, so products with no
/// dependents (plan outputs) come first and raw inputs come last.
pub fn object_dependency_order(graph: &DependencyGraph) -> ObjectOrder {
    let mut nodes: IndexSet<&str> = IndexSet::new();
    let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();

    for (product, deps) in graph.edges() {
        nodes.insert(product.as_str());
        in_degree.entry(product.as_str()).or_insert(0);
        for dep in deps {
            nodes.insert(dep.as_str());
            *in_degree.entry(dep.as_str()).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .copied()
        .filter(|n| in_degree.get(n).copied().unwrap_or(0) == 0)
        .collect();

    let mut objects = Vec::with_capacity(nodes.len());
    while let Some(current) = queue.pop_front() {
        objects.push(current.to_string());
        for dep in graph.dependencies_of(current) {
            if let Some(degree) = in_degree.get_mut(dep.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dep.as_str());
                }
            }
        }
    }

    ObjectOrder {
        complete: objects.len() == nodes.len(),
        objects,
    }
}
