//! Serialization test runner
//!
//! Table-driven cases for XML (de)serialization fidelity. Each case is an
//! XML snippet, an optional expected output (defaulting to the input), and
//! a structural assertion. The runner registers two groups:
//!
//! * `xml_to_block` — parse the XML into a block and run the structural
//!   assertion on it.
//! * `xml_round_trip` — parse, serialize back to canonical pretty text, and
//!   compare against the expected XML. The round-trip workspace's id source
//!   is fixed to `"1"`, so any ids minted while parsing are reproducible.

use std::sync::Arc;

use crate::core::block::Block;
use crate::core::id::FixedIds;
use crate::core::registry::BlockRegistry;
use crate::core::workspace::Workspace;
use crate::xml::{block_to_dom, canonical_block_xml, dom_to_block, dom_to_pretty_text, text_to_dom};

use super::runner::{run_test_cases, CaseFailure, RunReport};

/// Checks the structure of a deserialized block; an `Err` carries the
/// human-readable reason the block is wrong.
pub type AssertBlockFn = Box<dyn Fn(&Block) -> Result<(), String>>;

/// One serialization test case.
pub struct SerializationTestCase {
    title: String,
    xml: String,
    expected_xml: Option<String>,
    assert_block: AssertBlockFn,
}

impl SerializationTestCase {
    /// A case whose round-trip output must equal its input XML.
    pub fn new(
        title: impl Into<String>,
        xml: impl Into<String>,
        assert_block: impl Fn(&Block) -> Result<(), String> + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            xml: xml.into(),
            expected_xml: None,
            assert_block: Box::new(assert_block),
        }
    }

    /// Expect the round-trip to produce `xml` instead of the input.
    pub fn expecting_xml(mut self, xml: impl Into<String>) -> Self {
        self.expected_xml = Some(xml.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The XML the round-trip output is compared against.
    fn expected_source(&self) -> &str {
        self.expected_xml.as_deref().unwrap_or(&self.xml)
    }
}

/// Run both serialization groups over the cases and return the report.
pub fn try_run_serialization_suite(
    registry: &BlockRegistry,
    cases: &[SerializationTestCase],
) -> RunReport {
    let mut report = RunReport::new();

    run_test_cases(
        &mut report,
        "xml_to_block",
        cases,
        SerializationTestCase::title,
        |_| Workspace::new(registry.clone()),
        |workspace, case| {
            let dom = text_to_dom(&case.xml)?;
            let block_id = dom_to_block(&dom, workspace)?;
            let block = workspace
                .find_block(&block_id)
                .ok_or_else(|| CaseFailure::Errored("deserialized block vanished".to_string()))?;
            (case.assert_block)(block).map_err(CaseFailure::Structure)
        },
    );

    run_test_cases(
        &mut report,
        "xml_round_trip",
        cases,
        SerializationTestCase::title,
        |_| Workspace::with_ids(registry.clone(), Arc::new(FixedIds::one())),
        |workspace, case| {
            let dom = text_to_dom(&case.xml)?;
            let block_id = dom_to_block(&dom, workspace)?;
            let block = workspace
                .find_block(&block_id)
                .ok_or_else(|| CaseFailure::Errored("deserialized block vanished".to_string()))?;

            let actual = dom_to_pretty_text(&block_to_dom(block));
            let expected = canonical_block_xml(case.expected_source())?;
            if actual != expected {
                return Err(CaseFailure::XmlMismatch { expected, actual });
            }
            Ok(())
        },
    );

    report
}

/// Run both groups, panicking with the rendered report if any case failed.
pub fn run_serialization_suite(registry: &BlockRegistry, cases: &[SerializationTestCase]) {
    try_run_serialization_suite(registry, cases).assert_success();
}
