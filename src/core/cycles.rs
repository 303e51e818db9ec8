//! PP-004: Cycle detection over the object dependency edges.
//!
//! Depth-first search from every unvisited edge source, in insertion order.
//! Reaching an object that is still on the active path closes a cycle, which
//! is recorded as the path slice from that object through the current node,
//! followed by the object again. Every cycle found is reported; cycles
//! rediscovered from different roots are not deduplicated.
//!
//! The traversal keeps its own frame stack so path depth is bounded by heap,
//! not by the call stack.

use super::graph::DependencyGraph;
use super::types::ObjectRef;
use rustc_hash::FxHashSet;

/// Find every cycle reachable in the dependency edges.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Vec<ObjectRef>> {
    let edges = graph.edges();
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut on_path: FxHashSet<&str> = FxHashSet::default();
    let mut cycles = Vec::new();

    for root in edges.keys() {
        if visited.contains(root.as_str()) {
            continue;
        }

        // (node, index of the next dependency to explore)
        let mut frames: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
        visited.insert(root.as_str());
        on_path.insert(root.as_str());

        while let Some(&(node, cursor)) = frames.last() {
            let Some(next) = edges.get(node).and_then(|deps| deps.get_index(cursor)) else {
                frames.pop();
                on_path.remove(node);
                continue;
            };
            if let Some(top) = frames.last_mut() {
                top.1 += 1;
            }

            let next = next.as_str();
            if !visited.contains(next) {
                visited.insert(next);
                on_path.insert(next);
                frames.push((next, 0));
            } else if on_path.contains(next) {
                if let Some(start) = frames.iter().position(|(n, _)| *n == next) {
                    let mut cycle: Vec<ObjectRef> =
                        frames[start..].iter().map(|(n, _)| n.to_string()).collect();
                    cycle.push(next.to_string());
                    cycles.push(cycle);
                }
            }
        }
    }

    if !cycles.is_empty() {
        tracing::debug!(count = cycles.len(), "dependency cycles detected");
    }
    cycles
}

/// Render a cycle path as `a -> b -> a`.
pub fn format_cycle(cycle: &[ObjectRef]) -> String {
    cycle.join(" -> ")
}
