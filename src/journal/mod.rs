//! Attempt journal — JSONL event log and plan fingerprints.

pub mod eventlog;
pub mod fingerprint;
