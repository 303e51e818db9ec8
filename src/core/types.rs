//! PP-001: All types of the plan validation model.
//!
//! Defines the wire shapes of object inventories, operation lists, plan
//! documents, diagnostics, validation reports, and attempt journal events.
//! All wire types derive Serialize/Deserialize for YAML/JSON roundtripping.

use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a physical or data artifact (reagent, sample, image).
///
/// Naming conventions such as `objects/initial/x.reagent` belong to the caller
/// and are never interpreted.
pub type ObjectRef = String;

// ============================================================================
// Plan document
// ============================================================================

/// A plan as produced by the object identification and operation definition
/// phases, plus the retry policy that governs regeneration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlanDocument {
    /// Declared object inventory
    #[serde(default)]
    pub identified_objects: ObjectInventory,

    /// Proposed operations (order-preserving)
    #[serde(default)]
    pub operations: OperationList,

    /// Regeneration policy
    #[serde(default)]
    pub policy: RetryPolicy,
}

/// An operation list on its own, as returned by one generation attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OperationDocument {
    #[serde(default)]
    pub operations: OperationList,
}

// ============================================================================
// Objects
// ============================================================================

/// Declared object inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectInventory {
    /// Objects that exist before any operation runs
    #[serde(default)]
    pub initial: IndexSet<ObjectRef>,

    /// Expected intermediates (informational, never validated against)
    #[serde(default)]
    pub intermediate: IndexSet<ObjectRef>,

    /// Objects the plan must produce
    #[serde(rename = "final", default)]
    pub final_objects: IndexSet<ObjectRef>,
}

impl ObjectInventory {
    /// Build an inventory from initial and final objects only.
    pub fn new<I, F>(initial: I, final_objects: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ObjectRef>,
        F: IntoIterator,
        F::Item: Into<ObjectRef>,
    {
        Self {
            initial: initial.into_iter().map(Into::into).collect(),
            intermediate: IndexSet::new(),
            final_objects: final_objects.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Operations
// ============================================================================

/// A unit of work consuming named objects and producing named objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Operation {
    /// Operation identifier (unique within a list)
    #[serde(rename = "operation_id")]
    pub id: String,

    /// Consumed objects
    #[serde(rename = "input", default)]
    pub inputs: Vec<ObjectRef>,

    /// Produced objects
    #[serde(rename = "output", default)]
    pub outputs: Vec<ObjectRef>,
}

impl Operation {
    pub fn new<I, O>(id: &str, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ObjectRef>,
        O: IntoIterator,
        O::Item: Into<ObjectRef>,
    {
        Self {
            id: id.to_string(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered operation list, validated on construction.
///
/// Every operation id is non-blank and unique. Lists that violate this are
/// rejected at the boundary instead of being validated as graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct OperationList {
    operations: Vec<Operation>,
}

impl OperationList {
    pub fn new(operations: Vec<Operation>) -> Result<Self, String> {
        let mut seen = IndexSet::new();
        for (idx, op) in operations.iter().enumerate() {
            if op.id.trim().is_empty() {
                return Err(format!("operation #{} has an empty operation_id", idx + 1));
            }
            if !seen.insert(op.id.as_str()) {
                return Err(format!("duplicate operation_id '{}'", op.id));
            }
        }
        Ok(Self { operations })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    pub fn as_slice(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Look up an operation by id.
    pub fn get(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }
}

impl TryFrom<Vec<Operation>> for OperationList {
    type Error = String;

    fn try_from(operations: Vec<Operation>) -> Result<Self, Self::Error> {
        Self::new(operations)
    }
}

impl From<OperationList> for Vec<Operation> {
    fn from(list: OperationList) -> Self {
        list.operations
    }
}

impl<'a> IntoIterator for &'a OperationList {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl JsonSchema for OperationList {
    fn schema_name() -> String {
        "OperationList".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <Vec<Operation>>::json_schema(gen)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Regeneration policy for the generate→validate loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RetryPolicy {
    /// Maximum generation attempts (including the first)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Diagnostic kind. The serialized tags are a stable contract for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    CircularDependency,
    MissingInput,
    UnusedOutput,
    MissingFinalOutput,
    DuplicateOutput,
    TopologicalSortFailed,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::UnusedOutput => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircularDependency => write!(f, "CIRCULAR_DEPENDENCY"),
            Self::MissingInput => write!(f, "MISSING_INPUT"),
            Self::UnusedOutput => write!(f, "UNUSED_OUTPUT"),
            Self::MissingFinalOutput => write!(f, "MISSING_FINAL_OUTPUT"),
            Self::DuplicateOutput => write!(f, "DUPLICATE_OUTPUT"),
            Self::TopologicalSortFailed => write!(f, "TOPOLOGICAL_SORT_FAILED"),
        }
    }
}

/// Whether a diagnostic blocks acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single structural finding about a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,

    /// Offending operation, when the finding is tied to one
    pub operation_id: Option<String>,

    /// Offending object, when the finding is tied to one
    pub object_path: Option<ObjectRef>,

    /// Human-readable description
    pub message: String,

    /// Minimal fix proposal
    pub suggestion: String,

    /// Producing operations (DUPLICATE_OUTPUT only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub producers: Vec<String>,

    /// Closed cycle path (CIRCULAR_DEPENDENCY only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<ObjectRef>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: String, suggestion: String) -> Self {
        Self {
            kind,
            operation_id: None,
            object_path: None,
            message,
            suggestion,
            producers: Vec::new(),
            cycle: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation_id: &str) -> Self {
        self.operation_id = Some(operation_id.to_string());
        self
    }

    pub fn with_object(mut self, object: &str) -> Self {
        self.object_path = Some(object.to_string());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of one validation call. Immutable once built.
///
/// Deserialization goes through [`ValidationReport::from_parts`], so a
/// stored `valid` flag or an order on a failed report is never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReportRecord")]
pub struct ValidationReport {
    valid: bool,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    execution_order: Vec<String>,
}

impl ValidationReport {
    /// Assemble a report. The execution order is kept only when there are
    /// no errors.
    pub fn from_parts(
        errors: Vec<Diagnostic>,
        warnings: Vec<Diagnostic>,
        execution_order: Vec<String>,
    ) -> Self {
        let valid = errors.is_empty();
        Self {
            valid,
            errors,
            warnings,
            execution_order: if valid { execution_order } else { Vec::new() },
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    /// Pretty-printed JSON rendering of the report.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("JSON serialize error: {}", e))
    }
}

/// Wire form of a report read back from disk; `valid` is recomputed.
#[derive(Deserialize)]
struct ReportRecord {
    #[serde(default)]
    errors: Vec<Diagnostic>,
    #[serde(default)]
    warnings: Vec<Diagnostic>,
    #[serde(default)]
    execution_order: Vec<String>,
}

impl From<ReportRecord> for ValidationReport {
    fn from(r: ReportRecord) -> Self {
        Self::from_parts(r.errors, r.warnings, r.execution_order)
    }
}

// ============================================================================
// Retry outcome
// ============================================================================

/// Summary of one generate→validate attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSummary {
    /// 1-based attempt number
    pub attempt: u32,

    /// BLAKE3 fingerprint of the generated operation list
    pub fingerprint: String,

    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,

    /// Generator returned the same operations as the previous attempt
    pub repeated: bool,
}

/// Result of the retry loop: the last operations and report, plus history.
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub attempts: Vec<AttemptSummary>,
    pub operations: OperationList,
    pub report: ValidationReport,
}

impl RetryOutcome {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}

// ============================================================================
// Batch records
// ============================================================================

/// Batch output line: a report, or the fatal error that prevented one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Journal events
// ============================================================================

/// Event for the JSONL attempt journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    RunStarted {
        run_id: String,
        max_attempts: u32,
        protoplan_version: String,
    },
    AttemptValidated {
        run_id: String,
        attempt: u32,
        fingerprint: String,
        valid: bool,
        errors: usize,
        warnings: usize,
        repeated: bool,
    },
    RunCompleted {
        run_id: String,
        attempts: u32,
        valid: bool,
    },
}

/// Timestamped event wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: JournalEvent,
}

// ============================================================================
// Tests
// ============================================================================
