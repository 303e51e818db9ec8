//! Protoplan — operation-graph validation for generated laboratory protocols.
//!
//! Checks that a proposed list of operations forms a grounded, acyclic
//! production graph over a declared object inventory, and computes a
//! deterministic execution order. Failed plans yield structured diagnostics
//! and correction feedback for regeneration.

pub mod cli;
pub mod core;
pub mod journal;

pub use crate::core::types::{
    Diagnostic, DiagnosticKind, ObjectInventory, ObjectRef, Operation, OperationList,
    ValidationReport,
};
pub use crate::core::validator::validate;
