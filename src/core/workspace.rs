//! PP-011: Workspace persistence — per-attempt artifacts and journaling.
//!
//! Layout:
//! ```text
//! <workspace>/
//!   journal.jsonl
//!   attempt-1/operations.json
//!   attempt-1/report.json
//!   final_report.json
//! ```

use super::retry::AttemptObserver;
use super::types::*;
use crate::journal::eventlog;
use std::path::{Path, PathBuf};

/// Directory holding one attempt's artifacts.
pub fn attempt_dir(workspace: &Path, attempt: u32) -> PathBuf {
    workspace.join(format!("attempt-{}", attempt))
}

/// Write a file atomically (write to temp, then rename).
pub fn write_atomic(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        format!(
            "cannot rename {} → {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })
}

/// Persist one attempt's operations and report.
pub fn save_attempt(
    workspace: &Path,
    attempt: u32,
    operations: &OperationList,
    report: &ValidationReport,
) -> Result<(), String> {
    let dir = attempt_dir(workspace, attempt);
    let doc = OperationDocument {
        operations: operations.clone(),
    };
    let ops_json =
        serde_json::to_string_pretty(&doc).map_err(|e| format!("serialize error: {}", e))?;
    write_atomic(&dir.join("operations.json"), &ops_json)?;
    write_atomic(&dir.join("report.json"), &report.to_json()?)
}

/// Load a persisted attempt report. Returns None if it doesn't exist.
pub fn load_report(workspace: &Path, attempt: u32) -> Result<Option<ValidationReport>, String> {
    let path = attempt_dir(workspace, attempt).join("report.json");
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let report = serde_json::from_str(&content)
        .map_err(|e| format!("invalid report {}: {}", path.display(), e))?;
    Ok(Some(report))
}

/// Attempt observer that persists artifacts and journals every attempt.
#[derive(Debug)]
pub struct WorkspaceRecorder {
    workspace: PathBuf,
    run_id: String,
}

impl WorkspaceRecorder {
    /// Open a recorder and journal the start of a run.
    pub fn start(workspace: &Path, policy: &RetryPolicy) -> Result<Self, String> {
        let run_id = eventlog::generate_run_id();
        eventlog::append_event(
            workspace,
            JournalEvent::RunStarted {
                run_id: run_id.clone(),
                max_attempts: policy.max_attempts,
                protoplan_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        )?;
        Ok(Self {
            workspace: workspace.to_path_buf(),
            run_id,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Journal the end of the run and write the final report.
    pub fn finish(&self, outcome: &RetryOutcome) -> Result<(), String> {
        write_atomic(
            &self.workspace.join("final_report.json"),
            &outcome.report.to_json()?,
        )?;
        eventlog::append_event(
            &self.workspace,
            JournalEvent::RunCompleted {
                run_id: self.run_id.clone(),
                attempts: outcome.attempts.last().map_or(0, |a| a.attempt),
                valid: outcome.is_valid(),
            },
        )
    }
}

impl AttemptObserver for WorkspaceRecorder {
    fn on_attempt(
        &mut self,
        summary: &AttemptSummary,
        operations: &OperationList,
        report: &ValidationReport,
    ) -> Result<(), String> {
        save_attempt(&self.workspace, summary.attempt, operations, report)?;
        eventlog::append_event(
            &self.workspace,
            JournalEvent::AttemptValidated {
                run_id: self.run_id.clone(),
                attempt: summary.attempt,
                fingerprint: summary.fingerprint.clone(),
                valid: summary.valid,
                errors: summary.error_count,
                warnings: summary.warning_count,
                repeated: summary.repeated,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::{run_with_retry, ReplayGenerator};
    use crate::core::validator::validate;

    fn sample() -> (OperationList, ValidationReport) {
        let ops = OperationList::new(vec![Operation::new("a", ["x"], ["y"])]).unwrap();
        let report = validate(&ObjectInventory::new(["x"], ["y"]), &ops);
        (ops, report)
    }

    #[test]
    fn test_pp011_attempt_dir() {
        assert_eq!(
            attempt_dir(Path::new("/ws"), 2),
            PathBuf::from("/ws/attempt-2")
        );
    }

    #[test]
    fn test_pp011_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let (ops, report) = sample();
        save_attempt(dir.path(), 1, &ops, &report).unwrap();

        let loaded = load_report(dir.path(), 1).unwrap().unwrap();
        assert_eq!(loaded, report);

        let ops_text =
            std::fs::read_to_string(dir.path().join("attempt-1/operations.json")).unwrap();
        let reparsed = crate::core::parser::parse_operations(&ops_text).unwrap();
        assert_eq!(reparsed, ops);
    }

    #[test]
    fn test_pp011_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_report(dir.path(), 7).unwrap().is_none());
    }

    #[test]
    fn test_pp011_load_tampered_report_recomputes_validity() {
        let dir = tempfile::tempdir().unwrap();
        let path = attempt_dir(dir.path(), 1).join("report.json");
        write_atomic(
            &path,
            r#"{"valid": true,
                "errors": [{"type": "MISSING_FINAL_OUTPUT", "operation_id": null,
                            "object_path": "z", "message": "m", "suggestion": "s"}],
                "warnings": [], "execution_order": ["a"]}"#,
        )
        .unwrap();
        let loaded = load_report(dir.path(), 1).unwrap().unwrap();
        assert!(!loaded.is_valid());
        assert!(loaded.execution_order().is_empty());
    }

    #[test]
    fn test_pp011_atomic_no_tmp_left() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/report.json");
        write_atomic(&path, "{}").unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("sub/report.tmp").exists());
    }

    #[test]
    fn test_pp011_recorder_journals_run() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().join("workspace");
        let inventory = ObjectInventory::new(["x"], ["z"]);
        let broken = OperationList::new(vec![Operation::new("a", ["x"], ["y"])]).unwrap();
        let fixed = OperationList::new(vec![
            Operation::new("a", ["x"], ["y"]),
            Operation::new("b", ["y"], ["z"]),
        ])
        .unwrap();

        let policy = RetryPolicy::default();
        let mut recorder = WorkspaceRecorder::start(&ws, &policy).unwrap();
        let mut gen = ReplayGenerator::new(vec![broken, fixed]);
        let outcome = run_with_retry(&mut gen, &inventory, &policy, &mut recorder).unwrap();
        recorder.finish(&outcome).unwrap();

        assert!(ws.join("attempt-1/report.json").exists());
        assert!(ws.join("attempt-2/operations.json").exists());
        assert!(!ws.join("attempt-3").exists());
        assert!(ws.join("final_report.json").exists());

        let events = eventlog::read_events(&ws).unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0].event, JournalEvent::RunStarted { .. }));
        assert!(matches!(
            events[1].event,
            JournalEvent::AttemptValidated { attempt: 1, valid: false, .. }
        ));
        match &events[3].event {
            JournalEvent::RunCompleted {
                run_id,
                attempts,
                valid,
            } => {
                assert_eq!(run_id, recorder.run_id());
                assert_eq!(*attempts, 2);
                assert!(*valid);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_pp011_recorder_journals_last_attempt_number() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = ObjectInventory::new(["x"], ["z"]);
        let broken = OperationList::new(vec![Operation::new("a", ["x"], ["y"])]).unwrap();
        let policy = RetryPolicy { max_attempts: 3 };

        let mut recorder = WorkspaceRecorder::start(dir.path(), &policy).unwrap();
        let mut gen = ReplayGenerator::new(vec![broken.clone(), broken.clone(), broken]);
        let outcome = run_with_retry(&mut gen, &inventory, &policy, &mut recorder).unwrap();
        recorder.finish(&outcome).unwrap();

        let events = eventlog::read_events(dir.path()).unwrap();
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(JournalEvent::RunCompleted {
                attempts: 3,
                valid: false,
                ..
            })
        ));
    }
}
