//! PP-012: Append-only JSONL attempt journal.

use crate::core::types::{JournalEvent, TimestampedEvent};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Current UTC time as an ISO 8601 timestamp (second precision).
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Generate a run ID.
pub fn generate_run_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("r-{}", &id[..12])
}

/// Derive the journal path inside a workspace.
pub fn journal_path(workspace: &Path) -> PathBuf {
    workspace.join("journal.jsonl")
}

/// Append an event to the workspace journal.
pub fn append_event(workspace: &Path, event: JournalEvent) -> Result<(), String> {
    let path = journal_path(workspace);
    std::fs::create_dir_all(workspace)
        .map_err(|e| format!("cannot create workspace {}: {}", workspace.display(), e))?;

    let te = TimestampedEvent {
        ts: now_iso8601(),
        event,
    };
    let json = serde_json::to_string(&te).map_err(|e| format!("JSON serialize error: {}", e))?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("cannot open journal {}: {}", path.display(), e))?;

    writeln!(file, "{}", json).map_err(|e| format!("write error: {}", e))?;

    Ok(())
}

/// Read every event back from a workspace journal.
pub fn read_events(workspace: &Path) -> Result<Vec<TimestampedEvent>, String> {
    let path = journal_path(workspace);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read journal {}: {}", path.display(), e))?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| format!("{} line {}: {}", path.display(), i + 1, e))
        })
        .collect()
}
