//! PP-009: Generate→validate retry loop.
//!
//! Operation lists come from a [`PlanGenerator`] (in production, a language
//! model call; offline, a [`ReplayGenerator`]). Each attempt is validated
//! from scratch. A failed attempt's errors are turned into correction
//! feedback for the next generation call, up to the policy's attempt bound.
//! The loop stops at the first valid report; otherwise the last report is
//! returned unchanged.

use super::feedback::format_feedback;
use super::parser;
use super::types::*;
use super::validator::validate;
use crate::journal::fingerprint::fingerprint_operations;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Source of candidate operation lists.
pub trait PlanGenerator {
    /// Produce an operation list for the inventory. `feedback` carries the
    /// previous attempt's correction message, absent on the first attempt.
    fn generate(
        &mut self,
        inventory: &ObjectInventory,
        feedback: Option<&str>,
    ) -> Result<OperationList, String>;
}

impl<F> PlanGenerator for F
where
    F: FnMut(&ObjectInventory, Option<&str>) -> Result<OperationList, String>,
{
    fn generate(
        &mut self,
        inventory: &ObjectInventory,
        feedback: Option<&str>,
    ) -> Result<OperationList, String> {
        self(inventory, feedback)
    }
}

/// Receives every attempt as soon as it is validated.
pub trait AttemptObserver {
    fn on_attempt(
        &mut self,
        summary: &AttemptSummary,
        operations: &OperationList,
        report: &ValidationReport,
    ) -> Result<(), String>;
}

/// Observer that records nothing.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl AttemptObserver for NoopObserver {
    fn on_attempt(
        &mut self,
        _summary: &AttemptSummary,
        _operations: &OperationList,
        _report: &ValidationReport,
    ) -> Result<(), String> {
        Ok(())
    }
}

/// Run generation and validation until a plan validates or the attempt
/// bound is reached. Generator and observer errors abort the loop.
pub fn run_with_retry<G, O>(
    generator: &mut G,
    inventory: &ObjectInventory,
    policy: &RetryPolicy,
    observer: &mut O,
) -> Result<RetryOutcome, String>
where
    G: PlanGenerator + ?Sized,
    O: AttemptObserver + ?Sized,
{
    if policy.max_attempts == 0 {
        return Err("policy.max_attempts must be at least 1".to_string());
    }

    let mut attempts: Vec<AttemptSummary> = Vec::new();
    let mut last: Option<(OperationList, ValidationReport)> = None;

    for attempt in 1..=policy.max_attempts {
        let feedback = last.as_ref().and_then(|(_, report)| format_feedback(report));
        tracing::info!(
            attempt,
            max_attempts = policy.max_attempts,
            with_feedback = feedback.is_some(),
            "generating operations"
        );

        let operations = generator
            .generate(inventory, feedback.as_deref())
            .map_err(|e| format!("generation failed on attempt {}: {}", attempt, e))?;
        let report = validate(inventory, &operations);

        let fingerprint = fingerprint_operations(&operations)?;
        let repeated = attempts
            .last()
            .is_some_and(|prev| prev.fingerprint == fingerprint);
        if repeated {
            tracing::warn!(attempt, %fingerprint, "generator repeated the previous operations");
        }

        let summary = AttemptSummary {
            attempt,
            fingerprint,
            valid: report.is_valid(),
            error_count: report.errors().len(),
            warning_count: report.warnings().len(),
            repeated,
        };
        observer.on_attempt(&summary, &operations, &report)?;

        if report.is_valid() {
            tracing::info!(attempt, warnings = summary.warning_count, "plan validated");
        } else {
            tracing::warn!(attempt, errors = summary.error_count, "plan failed validation");
        }

        let done = report.is_valid();
        attempts.push(summary);
        last = Some((operations, report));
        if done {
            break;
        }
    }

    let (operations, report) =
        last.ok_or_else(|| "retry loop produced no attempts".to_string())?;
    Ok(RetryOutcome {
        attempts,
        operations,
        report,
    })
}

/// Offline generator that hands out pre-recorded operation lists in order.
/// Every feedback message it receives is kept for inspection.
#[derive(Debug, Default)]
pub struct ReplayGenerator {
    candidates: VecDeque<OperationList>,
    received_feedback: Vec<Option<String>>,
}

impl ReplayGenerator {
    pub fn new(candidates: Vec<OperationList>) -> Self {
        Self {
            candidates: candidates.into(),
            received_feedback: Vec::new(),
        }
    }

    /// Load candidates from operation documents on disk.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, String> {
        let candidates = paths
            .iter()
            .map(|p| parser::parse_operations_file(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(candidates))
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }

    pub fn received_feedback(&self) -> &[Option<String>] {
        &self.received_feedback
    }
}

impl PlanGenerator for ReplayGenerator {
    fn generate(
        &mut self,
        _inventory: &ObjectInventory,
        feedback: Option<&str>,
    ) -> Result<OperationList, String> {
        self.received_feedback.push(feedback.map(str::to_string));
        self.candidates
            .pop_front()
            .ok_or_else(|| "no more recorded candidates".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> ObjectInventory {
        ObjectInventory::new(["reagent"], ["result"])
    }

    fn broken() -> OperationList {
        OperationList::new(vec![Operation::new("stain", ["gel"], ["result"])]).unwrap()
    }

    fn fixed() -> OperationList {
        OperationList::new(vec![
            Operation::new("run_gel", ["reagent"], ["gel"]),
            Operation::new("stain", ["gel"], ["result"]),
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<AttemptSummary>,
    }

    impl AttemptObserver for Recorder {
        fn on_attempt(
            &mut self,
            summary: &AttemptSummary,
            _operations: &OperationList,
            _report: &ValidationReport,
        ) -> Result<(), String> {
            self.seen.push(summary.clone());
            Ok(())
        }
    }

    #[test]
    fn test_pp009_first_attempt_valid() {
        let mut gen = ReplayGenerator::new(vec![fixed(), broken()]);
        let outcome =
            run_with_retry(&mut gen, &inventory(), &RetryPolicy::default(), &mut NoopObserver)
                .unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.report.execution_order(), ["run_gel", "stain"]);
        assert_eq!(gen.remaining(), 1);
        assert_eq!(gen.received_feedback().len(), 1);
        assert!(gen.received_feedback()[0].is_none());
    }

    #[test]
    fn test_pp009_repairs_with_feedback() {
        let mut gen = ReplayGenerator::new(vec![broken(), fixed()]);
        let mut recorder = Recorder::default();
        let outcome =
            run_with_retry(&mut gen, &inventory(), &RetryPolicy::default(), &mut recorder)
                .unwrap();

        assert!(outcome.is_valid());
        assert_eq!(outcome.attempts.len(), 2);
        assert!(!outcome.attempts[0].valid);
        assert_eq!(outcome.attempts[0].error_count, 1);
        assert!(outcome.attempts[1].valid);
        assert_eq!(recorder.seen, outcome.attempts);

        let feedback = gen.received_feedback();
        assert!(feedback[0].is_none());
        let second = feedback[1].as_deref().unwrap();
        assert!(second.contains("1. Input 'gel' of operation 'stain'"));
    }

    #[test]
    fn test_pp009_exhausts_attempts() {
        let mut gen = ReplayGenerator::new(vec![broken(), broken(), broken(), fixed()]);
        let outcome =
            run_with_retry(&mut gen, &inventory(), &RetryPolicy::default(), &mut NoopObserver)
                .unwrap();
        assert!(!outcome.is_valid());
        assert_eq!(outcome.attempts.len(), 3);
        assert_eq!(outcome.operations, broken());
        assert_eq!(outcome.report, validate(&inventory(), &broken()));
        assert_eq!(gen.remaining(), 1);
    }

    #[test]
    fn test_pp009_flags_repeated_plan() {
        let mut gen = ReplayGenerator::new(vec![broken(), broken()]);
        let outcome = run_with_retry(
            &mut gen,
            &inventory(),
            &RetryPolicy { max_attempts: 2 },
            &mut NoopObserver,
        )
        .unwrap();
        assert!(!outcome.attempts[0].repeated);
        assert!(outcome.attempts[1].repeated);
        assert_eq!(outcome.attempts[0].fingerprint, outcome.attempts[1].fingerprint);
    }

    #[test]
    fn test_pp009_generator_error_aborts() {
        let mut gen = ReplayGenerator::new(vec![broken()]);
        let err =
            run_with_retry(&mut gen, &inventory(), &RetryPolicy::default(), &mut NoopObserver)
                .unwrap_err();
        assert!(err.contains("attempt 2"));
        assert!(err.contains("no more recorded candidates"));
    }

    #[test]
    fn test_pp009_zero_attempts_rejected() {
        let mut gen = ReplayGenerator::new(vec![fixed()]);
        let result = run_with_retry(
            &mut gen,
            &inventory(),
            &RetryPolicy { max_attempts: 0 },
            &mut NoopObserver,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_pp009_closure_generator() {
        let mut calls = 0;
        let mut gen = |_: &ObjectInventory, feedback: Option<&str>| -> Result<OperationList, String> {
            calls += 1;
            Ok(if feedback.is_some() { fixed() } else { broken() })
        };
        let outcome =
            run_with_retry(&mut gen, &inventory(), &RetryPolicy::default(), &mut NoopObserver)
                .unwrap();
        assert!(outcome.is_valid());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_pp009_replay_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempt1.yaml");
        std::fs::write(
            &path,
            "operations:\n  - operation_id: a\n    input: [reagent]\n    output: [result]\n",
        )
        .unwrap();
        let mut gen = ReplayGenerator::from_files(&[path]).unwrap();
        assert_eq!(gen.remaining(), 1);
        let ops = gen.generate(&inventory(), None).unwrap();
        assert_eq!(ops.as_slice()[0].id, "a");
    }
}
