//! PP-003: Object dependency graph construction.
//!
//! Derives the producer map, consumer map, and `output -> input` dependency
//! edges from an operation list. All maps preserve first-insertion order so
//! every downstream traversal is deterministic.

use super::types::{ObjectRef, OperationList};
use indexmap::{IndexMap, IndexSet};

/// Producer/consumer maps and object-level dependency edges for one
/// validation call. Immutable after [`DependencyGraph::build`].
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    producers: IndexMap<ObjectRef, String>,
    consumers: IndexMap<ObjectRef, Vec<String>>,
    edges: IndexMap<ObjectRef, IndexSet<ObjectRef>>,
    producer_counts: IndexMap<ObjectRef, Vec<String>>,
}

impl DependencyGraph {
    /// Build the graph. Never fails; duplicate producers keep the first
    /// producer and are reported later from [`Self::producer_counts`].
    pub fn build(operations: &OperationList) -> Self {
        let mut graph = Self::default();

        for op in operations {
            for output in &op.outputs {
                graph
                    .producers
                    .entry(output.clone())
                    .or_insert_with(|| op.id.clone());
                graph
                    .producer_counts
                    .entry(output.clone())
                    .or_default()
                    .push(op.id.clone());
            }

            for input in &op.inputs {
                graph
                    .consumers
                    .entry(input.clone())
                    .or_default()
                    .push(op.id.clone());

                for output in &op.outputs {
                    graph
                        .edges
                        .entry(output.clone())
                        .or_default()
                        .insert(input.clone());
                }
            }
        }

        tracing::debug!(
            operations = operations.len(),
            produced = graph.producers.len(),
            consumed = graph.consumers.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    /// Operation that first produces `object`.
    pub fn producer_of(&self, object: &str) -> Option<&str> {
        self.producers.get(object).map(String::as_str)
    }

    pub fn is_produced(&self, object: &str) -> bool {
        self.producers.contains_key(object)
    }

    pub fn is_consumed(&self, object: &str) -> bool {
        self.consumers.contains_key(object)
    }

    pub fn producers(&self) -> &IndexMap<ObjectRef, String> {
        &self.producers
    }

    pub fn consumers(&self) -> &IndexMap<ObjectRef, Vec<String>> {
        &self.consumers
    }

    /// Adjacency of the dependency edges: each key depends on every object
    /// in its set. Keys are outputs of operations with at least one input.
    pub fn edges(&self) -> &IndexMap<ObjectRef, IndexSet<ObjectRef>> {
        &self.edges
    }

    /// Objects `object` directly depends on.
    pub fn dependencies_of(&self, object: &str) -> impl Iterator<Item = &ObjectRef> {
        self.edges.get(object).into_iter().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexSet::len).sum()
    }

    /// Every producing operation per output object, in operation order,
    /// including repeats that the first-wins producer map hides.
    pub fn producer_counts(&self) -> &IndexMap<ObjectRef, Vec<String>> {
        &self.producer_counts
    }
}
