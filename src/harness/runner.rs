//! Generic test-case runner and reports
//!
//! Both suite runners delegate the iteration here: every case gets a fresh
//! workspace (setup), runs its body, and has its outcome recorded
//! (teardown is the workspace drop). A failing case never stops the group;
//! the report carries every outcome and the panicking entry points render
//! it when anything failed.

use std::fmt;

use serde::Serialize;

use crate::codegen::{GeneratorError, Order};
use crate::core::block::BlockError;
use crate::core::registry::RegistryError;
use crate::core::workspace::Workspace;
use crate::xml::XmlError;

fn fmt_order(order: &Option<Order>) -> String {
    match order {
        Some(order) => order.to_string(),
        None => "none".to_string(),
    }
}

/// Why a test case failed.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum CaseFailure {
    /// Generated code differs from the exact expected string
    #[error("generated code mismatch\n  expected: {expected:?}\n  actual:   {actual:?}")]
    CodeMismatch { expected: String, actual: String },

    /// Generated code does not match the expected pattern
    #[error("generated code {actual:?} does not match pattern /{pattern}/")]
    PatternMismatch { pattern: String, actual: String },

    /// Unpacked expression order differs from the expected one
    #[error("inner order mismatch: expected {expected}, actual {}", fmt_order(.actual))]
    OrderMismatch {
        expected: Order,
        actual: Option<Order>,
    },

    /// Round-tripped XML differs from the expected canonical form
    #[error("serialized XML mismatch\n--- expected ---\n{expected}\n--- actual ---\n{actual}")]
    XmlMismatch { expected: String, actual: String },

    /// The case's structural assertion rejected the block
    #[error("block structure assertion failed: {0}")]
    Structure(String),

    /// The case body errored before reaching an assertion
    #[error("case error: {0}")]
    Errored(String),
}

impl From<XmlError> for CaseFailure {
    fn from(error: XmlError) -> Self {
        CaseFailure::Errored(error.to_string())
    }
}

impl From<BlockError> for CaseFailure {
    fn from(error: BlockError) -> Self {
        CaseFailure::Errored(error.to_string())
    }
}

impl From<RegistryError> for CaseFailure {
    fn from(error: RegistryError) -> Self {
        CaseFailure::Errored(error.to_string())
    }
}

impl From<GeneratorError> for CaseFailure {
    fn from(error: GeneratorError) -> Self {
        CaseFailure::Errored(error.to_string())
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaseOutcome {
    Passed,
    Failed(CaseFailure),
}

/// One executed test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    /// Group (suite or phase) the case ran under
    pub group: String,
    /// Case title
    pub title: String,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    pub fn is_passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed)
    }
}

/// Ordered outcomes of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    cases: Vec<CaseReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one case outcome.
    pub fn record(&mut self, report: CaseReport) {
        self.cases.push(report);
    }

    /// All case reports, in execution order.
    pub fn cases(&self) -> &[CaseReport] {
        &self.cases
    }

    /// Number of passed cases.
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.is_passed()).count()
    }

    /// Number of failed cases.
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// The failed case reports, in execution order.
    pub fn failures(&self) -> Vec<&CaseReport> {
        self.cases.iter().filter(|c| !c.is_passed()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Render the report as JSON, for tooling that consumes run results.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Panic with the rendered report if any case failed.
    ///
    /// This is how results surface through the enclosing test framework:
    /// the panicking entry points call it after every case has run.
    pub fn assert_success(&self) {
        if !self.is_success() {
            panic!("{}", self);
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in self.failures() {
            if let CaseOutcome::Failed(failure) = &case.outcome {
                writeln!(f, "FAILED {} :: {}", case.group, case.title)?;
                for line in failure.to_string().lines() {
                    writeln!(f, "    {}", line)?;
                }
            }
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}

/// Run every case in a group, recording one outcome per case.
///
/// # Arguments
/// * `report` - Accumulates the outcomes
/// * `group` - Group name recorded on each case report
/// * `cases` - Case descriptors, run in order
/// * `title_of` - Case title accessor
/// * `workspace_for` - Builds the fresh workspace a case runs against
/// * `body` - The per-case callback; an `Err` marks the case failed
pub fn run_test_cases<C>(
    report: &mut RunReport,
    group: &str,
    cases: &[C],
    title_of: impl Fn(&C) -> &str,
    mut workspace_for: impl FnMut(&C) -> Workspace,
    mut body: impl FnMut(&mut Workspace, &C) -> Result<(), CaseFailure>,
) {
    for case in cases {
        let title = title_of(case);
        let span = tracing::debug_span!("test_case", group, title);
        let _guard = span.enter();

        let mut workspace = workspace_for(case);
        let outcome = match body(&mut workspace, case) {
            Ok(()) => CaseOutcome::Passed,
            Err(failure) => {
                tracing::debug!(%failure, "case failed");
                CaseOutcome::Failed(failure)
            }
        };
        report.record(CaseReport {
            group: group.to_string(),
            title: title.to_string(),
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::BlockRegistry;

    fn case_titles() -> Vec<String> {
        vec!["first".to_string(), "second".to_string(), "third".to_string()]
    }

    #[test]
    fn test_all_cases_run_even_after_a_failure() {
        let registry = BlockRegistry::new();
        let mut report = RunReport::new();

        run_test_cases(
            &mut report,
            "group",
            &case_titles(),
            |title| title,
            |_| Workspace::new(registry.clone()),
            |_, title| {
                if title == "second" {
                    Err(CaseFailure::Structure("nope".to_string()))
                } else {
                    Ok(())
                }
            },
        );

        assert_eq!(report.len(), 3);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures()[0].title, "second");
        assert!(!report.is_success());
    }

    #[test]
    fn test_each_case_gets_a_fresh_workspace() {
        let registry = BlockRegistry::new();
        let mut report = RunReport::new();

        run_test_cases(
            &mut report,
            "group",
            &case_titles(),
            |title| title,
            |_| Workspace::new(registry.clone()),
            |workspace, _| {
                // a dirty workspace from a previous case would be non-empty
                assert!(workspace.is_empty());
                Ok(())
            },
        );

        assert!(report.is_success());
    }

    #[test]
    #[should_panic(expected = "1 failed")]
    fn test_assert_success_panics_with_the_report() {
        let mut report = RunReport::new();
        report.record(CaseReport {
            group: "g".to_string(),
            title: "t".to_string(),
            outcome: CaseOutcome::Failed(CaseFailure::Structure("bad".to_string())),
        });
        report.assert_success();
    }

    #[test]
    fn test_report_json_export() {
        let mut report = RunReport::new();
        report.record(CaseReport {
            group: "g".to_string(),
            title: "t".to_string(),
            outcome: CaseOutcome::Passed,
        });

        let json = report.to_json().unwrap();
        assert!(json.contains("\"Passed\""));
    }
}
