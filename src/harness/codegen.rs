//! Code-generation test runner
//!
//! Table-driven cases for generator output: each case builds a block in a
//! fresh workspace, generates code for it (or for the whole workspace), and
//! checks the result against an exact string or a pattern, optionally with
//! the expression's inner order.

use regex::Regex;

use crate::codegen::{Generator, Order};
use crate::core::registry::BlockRegistry;
use crate::core::workspace::Workspace;
use crate::core::BlockId;

use super::runner::{run_test_cases, CaseFailure, RunReport};

/// What the generated code must look like.
///
/// The two comparison modes are distinct variants: an exact string compares
/// by equality, a pattern must match the whole generated string.
#[derive(Debug, Clone)]
pub enum ExpectedCode {
    /// Generated code must equal this string exactly
    Exact(String),
    /// Generated code must match this pattern in full
    Pattern { source: String, regex: Regex },
}

impl ExpectedCode {
    /// Expect exact equality with `code`.
    pub fn exact(code: impl Into<String>) -> Self {
        ExpectedCode::Exact(code.into())
    }

    /// Expect a full match against `pattern`.
    ///
    /// The pattern is anchored on both ends at compile time, so
    /// `"print\\(.*\\);"` accepts `print(5);` but not `x; print(5);`.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(ExpectedCode::Pattern {
            source: pattern.to_string(),
            regex,
        })
    }

    fn check(&self, actual: &str) -> Result<(), CaseFailure> {
        match self {
            ExpectedCode::Exact(expected) => {
                if actual == expected {
                    Ok(())
                } else {
                    Err(CaseFailure::CodeMismatch {
                        expected: expected.clone(),
                        actual: actual.to_string(),
                    })
                }
            }
            ExpectedCode::Pattern { source, regex } => {
                if regex.is_match(actual) {
                    Ok(())
                } else {
                    Err(CaseFailure::PatternMismatch {
                        pattern: source.clone(),
                        actual: actual.to_string(),
                    })
                }
            }
        }
    }
}

/// Builds the block under test inside the case's workspace and returns the
/// id of the block to generate code for.
pub type CreateBlockFn = Box<dyn Fn(&mut Workspace) -> Result<BlockId, CaseFailure>>;

/// One code-generation test case.
pub struct CodeGenerationTestCase {
    title: String,
    expected: ExpectedCode,
    use_workspace_to_code: bool,
    expected_inner_order: Option<Order>,
    create_block: CreateBlockFn,
}

impl CodeGenerationTestCase {
    /// A case that generates code for the single created block and checks
    /// it against `expected`. Workspace mode and the inner-order check are
    /// off by default.
    pub fn new(
        title: impl Into<String>,
        expected: ExpectedCode,
        create_block: impl Fn(&mut Workspace) -> Result<BlockId, CaseFailure> + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            expected,
            use_workspace_to_code: false,
            expected_inner_order: None,
            create_block: Box::new(create_block),
        }
    }

    /// Generate code for the whole workspace instead of the single block.
    pub fn via_workspace_to_code(mut self) -> Self {
        self.use_workspace_to_code = true;
        self
    }

    /// Also assert the unpacked expression order. Ignored in workspace
    /// mode.
    pub fn expecting_inner_order(mut self, order: Order) -> Self {
        self.expected_inner_order = Some(order);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A group of cases sharing one generator.
pub struct CodeGenerationTestSuite {
    name: String,
    generator: Box<dyn Generator>,
    cases: Vec<CodeGenerationTestCase>,
}

impl CodeGenerationTestSuite {
    pub fn new(
        name: impl Into<String>,
        generator: impl Generator + 'static,
        cases: Vec<CodeGenerationTestCase>,
    ) -> Self {
        Self {
            name: name.into(),
            generator: Box::new(generator),
            cases,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Run every suite and return the collected report.
///
/// Per case: build the block via the case's `create_block` against a fresh
/// workspace; generate via `workspace_to_code` or `init` + `block_to_code`;
/// check the code against the expectation; in single-block mode, check the
/// unpacked order when the case expects one.
pub fn try_run_code_generation_suites(
    registry: &BlockRegistry,
    suites: Vec<CodeGenerationTestSuite>,
) -> RunReport {
    let mut report = RunReport::new();
    for suite in suites {
        let CodeGenerationTestSuite {
            name,
            mut generator,
            cases,
        } = suite;
        tracing::debug!(suite = %name, generator = generator.name(), "running code generation suite");

        run_test_cases(
            &mut report,
            &name,
            &cases,
            CodeGenerationTestCase::title,
            |_| Workspace::new(registry.clone()),
            |workspace, case| {
                let block_id = (case.create_block)(workspace)?;

                let (code, order) = if case.use_workspace_to_code {
                    (generator.workspace_to_code(workspace)?, None)
                } else {
                    generator.init(workspace);
                    let block = workspace.find_block(&block_id).ok_or_else(|| {
                        CaseFailure::Errored(format!(
                            "created block '{}' is not in the workspace",
                            block_id
                        ))
                    })?;
                    let generated = generator.block_to_code(block)?;
                    let order = generated.order();
                    (generated.into_code(), order)
                };

                case.expected.check(&code)?;

                if !case.use_workspace_to_code {
                    if let Some(expected) = case.expected_inner_order {
                        if order != Some(expected) {
                            return Err(CaseFailure::OrderMismatch {
                                expected,
                                actual: order,
                            });
                        }
                    }
                }
                Ok(())
            },
        );
    }
    report
}

/// Run every suite, panicking with the rendered report if any case failed.
pub fn run_code_generation_suites(registry: &BlockRegistry, suites: Vec<CodeGenerationTestSuite>) {
    try_run_code_generation_suites(registry, suites).assert_success();
}
