//! PP-002: Plan parsing at the boundary.
//!
//! Parses plan documents (YAML or JSON) and batch task lines into validated
//! records. Structural problems that make a plan uninterpretable fail here:
//! - Operation records without an `operation_id`
//! - Blank or duplicate operation ids
//! - A retry policy with `max_attempts: 0`
//!
//! Graph-level problems are never reported here; they become diagnostics.

use super::types::*;
use std::path::Path;

/// Parse a plan document from disk.
pub fn parse_plan_file(path: &Path) -> Result<PlanDocument, String> {
    let content = read_file(path)?;
    parse_plan(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Parse a plan document from a YAML or JSON string.
pub fn parse_plan(content: &str) -> Result<PlanDocument, String> {
    let plan: PlanDocument = deserialize(content)?;
    check_policy(&plan.policy)?;
    Ok(plan)
}

/// Parse an operation-only document (one generation attempt) from disk.
pub fn parse_operations_file(path: &Path) -> Result<OperationList, String> {
    let content = read_file(path)?;
    parse_operations(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Parse an operation-only document. Extra fields (such as a full plan's
/// `identified_objects`) are ignored.
pub fn parse_operations(content: &str) -> Result<OperationList, String> {
    let doc: OperationDocument = deserialize(content)?;
    Ok(doc.operations)
}

/// Parse one JSONL batch line of the form `{"id": ..., "plan": {...}}`.
///
/// The task id is recovered even when the plan is malformed so the failure
/// can be reported against it. Missing ids become `"unknown"`.
pub fn parse_task_line(line: &str) -> (String, Result<PlanDocument, String>) {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return ("unknown".to_string(), Err(format!("JSON parse error: {}", e))),
    };

    let id = match value.get("id") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    };

    let plan = match value.get("plan") {
        Some(plan) => serde_json::from_value::<PlanDocument>(plan.clone())
            .map_err(|e| format!("invalid plan: {}", e))
            .and_then(|plan| check_policy(&plan.policy).map(|_| plan)),
        None => Err("task has no 'plan' field".to_string()),
    };

    (id, plan)
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))
}

/// JSON first for `{`-led documents (tolerates tab indentation), then YAML,
/// which also covers flow mappings with unquoted keys.
fn deserialize<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, String> {
    if content.trim_start().starts_with('{') {
        if let Ok(value) = serde_json::from_str(content) {
            return Ok(value);
        }
    }
    serde_yaml_ng::from_str(content).map_err(|e| format!("YAML parse error: {}", e))
}

fn check_policy(policy: &RetryPolicy) -> Result<(), String> {
    if policy.max_attempts == 0 {
        return Err("policy.max_attempts must be at least 1".to_string());
    }
    Ok(())
}
