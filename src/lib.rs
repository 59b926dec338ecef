//! Block Harness - test-authoring helpers for the visual block editor
//!
//! This crate provides table-driven test runners for the block editor's two
//! recurring assertions: code generation output and XML serialization
//! fidelity. It carries the small object model those runners exercise
//! (blocks, workspaces, definitions, an injectable id source), the XML
//! codec, and the generator seam.

pub mod codegen;
pub mod core;
pub mod harness;
pub mod xml;
mod tests;

// Re-export commonly used types
pub use crate::core::{Block, BlockDefinition, BlockId, BlockRegistry, FieldValue, Workspace};
pub use codegen::{Generated, Generator, GeneratorError, Order};
pub use harness::{
    run_code_generation_suites, run_serialization_suite, CodeGenerationTestCase,
    CodeGenerationTestSuite, ExpectedCode, RunReport, SerializationTestCase,
};
pub use xml::XmlError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
