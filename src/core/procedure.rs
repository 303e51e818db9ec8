//! PP-010: Procedure ordering — operations arranged for rendering.
//!
//! A validated plan's operations, in execution order, are what the procedure
//! writer consumes. This module only orders and outlines; it does not
//! generate prose.

use super::types::*;

/// Operations of a valid plan, in execution order.
pub fn ordered_operations<'a>(
    operations: &'a OperationList,
    report: &ValidationReport,
) -> Result<Vec<&'a Operation>, String> {
    if !report.is_valid() {
        return Err(format!(
            "plan is invalid ({} error(s)); no execution order",
            report.errors().len()
        ));
    }

    report
        .execution_order()
        .iter()
        .map(|id| {
            operations
                .get(id)
                .ok_or_else(|| format!("execution order names unknown operation '{}'", id))
        })
        .collect()
}

/// Numbered plain-text outline: `1. op_id: in1, in2 -> out1`.
pub fn render_outline(ordered: &[&Operation]) -> String {
    ordered
        .iter()
        .enumerate()
        .map(|(i, op)| {
            let inputs = if op.inputs.is_empty() {
                "(nothing)".to_string()
            } else {
                op.inputs.join(", ")
            };
            format!("{}. {}: {} -> {}", i + 1, op.id, inputs, op.outputs.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
