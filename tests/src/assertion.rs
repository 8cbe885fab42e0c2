//! Helpers for checking run outcomes.

use osp_core::Value;
use osp_engine::{EngineError, RunFault, RunOutcome, RunState};

/// Render reported values as strings, for compact sequence comparisons.
///
/// Strings are taken verbatim; other values use their debug form.
pub fn report_strings(reports: &[Value]) -> Vec<String> {
    reports
        .iter()
        .map(|value| match value.as_str() {
            Some(s) => s.to_string(),
            None => format!("{:?}", value),
        })
        .collect()
}

/// Extension methods on a finished run.
pub trait OutcomeExt {
    /// Reports rendered with [`report_strings`].
    fn report_strings(&self) -> Vec<String>;
    /// Returns true if the queue ran empty.
    fn completed(&self) -> bool;
    /// Returns true if the run stopped early.
    fn disengaged(&self) -> bool;
}

impl OutcomeExt for RunOutcome {
    fn report_strings(&self) -> Vec<String> {
        report_strings(&self.reports)
    }

    fn completed(&self) -> bool {
        self.state == RunState::Completed
    }

    fn disengaged(&self) -> bool {
        self.state == RunState::Disengaged
    }
}

/// Unwrap the fault from a failed run. Panics on any other outcome.
pub fn expect_fault(result: Result<RunOutcome, EngineError>) -> RunFault {
    match result {
        Err(EngineError::Fault(fault)) => fault,
        Err(other) => panic!("expected an ability fault, got error: {}", other),
        Ok(outcome) => panic!("expected an ability fault, run ended {}", outcome.state),
    }
}
