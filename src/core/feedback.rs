//! PP-008: Correction feedback for the next generation attempt.

use super::types::ValidationReport;
use std::fmt::Write;

const PREAMBLE: &str =
    "The previously generated operations had the following errors. Please fix them:";

/// Render a failed report's errors as an enumerated correction message.
/// Returns `None` for a valid report. Warnings never appear in feedback.
pub fn format_feedback(report: &ValidationReport) -> Option<String> {
    if report.is_valid() {
        return None;
    }

    let mut out = String::from(PREAMBLE);
    out.push('\n');
    for (i, error) in report.errors().iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {}\n   Suggestion: {}\n",
            i + 1,
            error.message,
            error.suggestion
        );
    }
    Some(out)
}
