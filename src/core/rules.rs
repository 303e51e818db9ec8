//! PP-006: Structural rules over a built dependency graph.
//!
//! Five independent checks, all evaluated on every call:
//! - Cycle: every detected cycle is an error
//! - Ungrounded input: input neither initial nor produced
//! - Unreachable output: output neither final nor consumed (warning)
//! - Unproduced final object: declared final, never produced
//! - Duplicate producer: object output by two or more operations

use super::cycles::format_cycle;
use super::graph::DependencyGraph;
use super::types::*;
use indexmap::IndexSet;

/// Diagnostics from one pass of all rules.
#[derive(Debug, Clone, Default)]
pub struct RuleFindings {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// Run every rule. Errors are ordered: cycles, ungrounded inputs, unproduced
/// finals, duplicate producers.
pub fn check_all(
    inventory: &ObjectInventory,
    operations: &OperationList,
    graph: &DependencyGraph,
    cycles: &[Vec<ObjectRef>],
) -> RuleFindings {
    let mut errors = cycle_errors(cycles);
    errors.extend(ungrounded_inputs(inventory, operations, graph));
    let warnings = unused_outputs(inventory, operations, graph);
    errors.extend(unproduced_finals(inventory, graph));
    errors.extend(duplicate_producers(graph));

    tracing::debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "structural rules evaluated"
    );
    RuleFindings { errors, warnings }
}

/// One CIRCULAR_DEPENDENCY error per cycle.
pub fn cycle_errors(cycles: &[Vec<ObjectRef>]) -> Vec<Diagnostic> {
    cycles
        .iter()
        .map(|cycle| {
            let mut diag = Diagnostic::new(
                DiagnosticKind::CircularDependency,
                format!("Circular dependency detected: {}", format_cycle(cycle)),
                "Review the dependencies between operations and break the cycle.".to_string(),
            );
            diag.cycle = cycle.clone();
            diag
        })
        .collect()
}

/// One MISSING_INPUT error per (operation, input) whose input is neither
/// initial nor produced by any operation.
pub fn ungrounded_inputs(
    inventory: &ObjectInventory,
    operations: &OperationList,
    graph: &DependencyGraph,
) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    for op in operations {
        let mut reported: IndexSet<&str> = IndexSet::new();
        for input in &op.inputs {
            if inventory.initial.contains(input) || graph.is_produced(input) {
                continue;
            }
            if !reported.insert(input.as_str()) {
                continue;
            }
            errors.push(
                Diagnostic::new(
                    DiagnosticKind::MissingInput,
                    format!(
                        "Input '{}' of operation '{}' is not produced by any operation.",
                        input, op.id
                    ),
                    format!(
                        "Add an operation that produces '{}', or declare it as an initial object.",
                        input
                    ),
                )
                .with_operation(&op.id)
                .with_object(input),
            );
        }
    }
    errors
}

/// One UNUSED_OUTPUT warning per (operation, output) that is neither final
/// nor consumed.
pub fn unused_outputs(
    inventory: &ObjectInventory,
    operations: &OperationList,
    graph: &DependencyGraph,
) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();
    for op in operations {
        let mut reported: IndexSet<&str> = IndexSet::new();
        for output in &op.outputs {
            if inventory.final_objects.contains(output) || graph.is_consumed(output) {
                continue;
            }
            if !reported.insert(output.as_str()) {
                continue;
            }
            warnings.push(
                Diagnostic::new(
                    DiagnosticKind::UnusedOutput,
                    format!(
                        "Output '{}' of operation '{}' is never consumed by any operation.",
                        output, op.id
                    ),
                    format!(
                        "Add an operation that consumes '{}', or declare it as a final object.",
                        output
                    ),
                )
                .with_operation(&op.id)
                .with_object(output),
            );
        }
    }
    warnings
}

/// One MISSING_FINAL_OUTPUT error per declared final object nobody produces.
pub fn unproduced_finals(inventory: &ObjectInventory, graph: &DependencyGraph) -> Vec<Diagnostic> {
    inventory
        .final_objects
        .iter()
        .filter(|obj| !graph.is_produced(obj))
        .map(|obj| {
            Diagnostic::new(
                DiagnosticKind::MissingFinalOutput,
                format!("No operation produces the final object '{}'.", obj),
                format!("Add an operation that outputs '{}'.", obj),
            )
            .with_object(obj)
        })
        .collect()
}

/// One DUPLICATE_OUTPUT error per object with two or more producers.
pub fn duplicate_producers(graph: &DependencyGraph) -> Vec<Diagnostic> {
    graph
        .producer_counts()
        .iter()
        .filter(|(_, producers)| producers.len() > 1)
        .map(|(obj, producers)| {
            let mut diag = Diagnostic::new(
                DiagnosticKind::DuplicateOutput,
                format!(
                    "Object '{}' is produced by multiple operations: {}",
                    obj,
                    producers.join(", ")
                ),
                "Each object must be produced by exactly one operation. Remove the duplication."
                    .to_string(),
            )
            .with_object(obj);
            diag.producers = producers.clone();
            diag
        })
        .collect()
}

/// Error for an operation order that could not cover every operation.
pub fn sort_failure() -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::TopologicalSortFailed,
        "Could not determine an execution order for the operations. \
         A circular or unresolved dependency may exist."
            .to_string(),
        "Check the dependencies between operations.".to_string(),
    )
}
