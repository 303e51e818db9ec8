//! PP-007: Plan validation entry point.
//!
//! Builds the dependency graph, runs cycle detection, the structural rules,
//! and the operation sequencer against the same graph, and merges everything
//! into one [`ValidationReport`]. Each call builds its own graph and keeps
//! nothing afterwards.

use super::cycles::detect_cycles;
use super::graph::DependencyGraph;
use super::rules;
use super::sequencer::operation_order;
use super::types::*;

/// Validate an operation list against a declared object inventory.
pub fn validate(inventory: &ObjectInventory, operations: &OperationList) -> ValidationReport {
    let graph = DependencyGraph::build(operations);
    let cycles = detect_cycles(&graph);
    let rules::RuleFindings {
        mut errors,
        warnings,
    } = rules::check_all(inventory, operations, &graph, &cycles);

    let execution_order = operation_order(operations, &graph);
    // Cycle and grounding errors already explain an incomplete order
    if errors.is_empty() && execution_order.len() != operations.len() {
        errors.push(rules::sort_failure());
    }

    let report = ValidationReport::from_parts(errors, warnings, execution_order);
    tracing::debug!(
        valid = report.is_valid(),
        errors = report.errors().len(),
        warnings = report.warnings().len(),
        "plan validated"
    );
    report
}

/// Validate a whole plan document.
pub fn validate_plan(plan: &PlanDocument) -> ValidationReport {
    validate(&plan.identified_objects, &plan.operations)
}
