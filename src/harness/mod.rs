//! Test-authoring helpers
//!
//! Table-driven runners for the two things block tests assert over and
//! over: generated code and XML serialization fidelity. Test files build
//! descriptor lists and hand them to the entry points; results surface
//! through the enclosing test framework via the panicking forms, or as a
//! [`RunReport`] from the `try_` forms.

pub mod codegen;
pub mod runner;
pub mod serialization;

pub use codegen::{
    run_code_generation_suites, try_run_code_generation_suites, CodeGenerationTestCase,
    CodeGenerationTestSuite, CreateBlockFn, ExpectedCode,
};
pub use runner::{run_test_cases, CaseFailure, CaseOutcome, CaseReport, RunReport};
pub use serialization::{
    run_serialization_suite, try_run_serialization_suite, AssertBlockFn, SerializationTestCase,
};
