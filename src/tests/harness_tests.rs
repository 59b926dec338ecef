//! Tests for the two table-driven suite runners.

use crate::codegen::Order;
use crate::core::field::FieldValue;
use crate::harness::{
    run_code_generation_suites, run_serialization_suite, try_run_code_generation_suites,
    try_run_serialization_suite, CaseFailure, CaseOutcome, CodeGenerationTestCase,
    CodeGenerationTestSuite, ExpectedCode, SerializationTestCase,
};

use super::demo_blocks::{
    arithmetic_block, demo_registry, number_block, print_block, text_block, OutlineGenerator,
    ScriptGenerator,
};

fn failure_of(outcome: &CaseOutcome) -> &CaseFailure {
    match outcome {
        CaseOutcome::Failed(failure) => failure,
        CaseOutcome::Passed => panic!("expected a failed case"),
    }
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

#[test]
fn test_code_generation_suite_passes() {
    let registry = demo_registry();
    let suites = vec![CodeGenerationTestSuite::new(
        "script",
        ScriptGenerator,
        vec![
            CodeGenerationTestCase::new("number literal", ExpectedCode::exact("5"), |ws| {
                let block = number_block(ws, 5.0);
                Ok(ws.add(block))
            })
            .expecting_inner_order(Order::ATOMIC),
            CodeGenerationTestCase::new(
                "text literal matches pattern",
                ExpectedCode::pattern(r"'h.'").unwrap(),
                |ws| {
                    let block = text_block(ws, "hi");
                    Ok(ws.add(block))
                },
            ),
            CodeGenerationTestCase::new("product", ExpectedCode::exact("2 * 3"), |ws| {
                let a = number_block(ws, 2.0);
                let b = number_block(ws, 3.0);
                let block = arithmetic_block(ws, "MULTIPLY", a, b);
                Ok(ws.add(block))
            })
            .expecting_inner_order(Order::MULTIPLICATION),
            CodeGenerationTestCase::new(
                "whole workspace",
                ExpectedCode::exact("print('a');\nprint('b');"),
                |ws| {
                    let first = {
                        let value = text_block(ws, "a");
                        print_block(ws, value)
                    };
                    let second = {
                        let value = text_block(ws, "b");
                        print_block(ws, value)
                    };
                    let id = ws.add(first);
                    ws.add(second);
                    Ok(id)
                },
            )
            .via_workspace_to_code(),
        ],
    )];

    let report = try_run_code_generation_suites(&registry, suites);
    assert!(report.is_success(), "{}", report);
    assert_eq!(report.len(), 4);
}

#[test]
fn test_code_mismatch_fails_the_case_but_not_the_run() {
    let registry = demo_registry();
    let suites = vec![CodeGenerationTestSuite::new(
        "script",
        ScriptGenerator,
        vec![
            CodeGenerationTestCase::new("wrong expectation", ExpectedCode::exact("6"), |ws| {
                let block = number_block(ws, 5.0);
                Ok(ws.add(block))
            }),
            CodeGenerationTestCase::new("still runs", ExpectedCode::exact("7"), |ws| {
                let block = number_block(ws, 7.0);
                Ok(ws.add(block))
            }),
        ],
    )];

    let report = try_run_code_generation_suites(&registry, suites);
    assert_eq!(report.len(), 2);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 1);

    let failure = failure_of(&report.failures()[0].outcome);
    assert_eq!(
        failure,
        &CaseFailure::CodeMismatch {
            expected: "6".to_string(),
            actual: "5".to_string(),
        }
    );
}

#[test]
fn test_pattern_must_match_the_whole_string() {
    let registry = demo_registry();
    let suites = vec![CodeGenerationTestSuite::new(
        "script",
        ScriptGenerator,
        vec![CodeGenerationTestCase::new(
            "single digit",
            ExpectedCode::pattern(r"\d").unwrap(),
            |ws| {
                let block = number_block(ws, 55.0);
                Ok(ws.add(block))
            },
        )],
    )];

    let report = try_run_code_generation_suites(&registry, suites);
    let failure = failure_of(&report.failures()[0].outcome);
    assert_eq!(
        failure,
        &CaseFailure::PatternMismatch {
            pattern: r"\d".to_string(),
            actual: "55".to_string(),
        }
    );
}

#[test]
fn test_inner_order_mismatch_is_reported() {
    let registry = demo_registry();
    let suites = vec![CodeGenerationTestSuite::new(
        "script",
        ScriptGenerator,
        vec![CodeGenerationTestCase::new("number literal", ExpectedCode::exact("5"), |ws| {
            let block = number_block(ws, 5.0);
            Ok(ws.add(block))
        })
        .expecting_inner_order(Order::ADDITION)],
    )];

    let report = try_run_code_generation_suites(&registry, suites);
    let failure = failure_of(&report.failures()[0].outcome);
    assert_eq!(
        failure,
        &CaseFailure::OrderMismatch {
            expected: Order::ADDITION,
            actual: Some(Order::ATOMIC),
        }
    );
}

#[test]
fn test_statement_block_has_no_order_to_check() {
    let registry = demo_registry();
    let suites = vec![CodeGenerationTestSuite::new(
        "script",
        ScriptGenerator,
        vec![CodeGenerationTestCase::new(
            "print statement",
            ExpectedCode::exact("print('hi');"),
            |ws| {
                let value = text_block(ws, "hi");
                let block = print_block(ws, value);
                Ok(ws.add(block))
            },
        )
        .expecting_inner_order(Order::ATOMIC)],
    )];

    let report = try_run_code_generation_suites(&registry, suites);
    let failure = failure_of(&report.failures()[0].outcome);
    assert_eq!(
        failure,
        &CaseFailure::OrderMismatch {
            expected: Order::ATOMIC,
            actual: None,
        }
    );
}

#[test]
fn test_suites_run_per_generator() {
    let registry = demo_registry();
    let suites = vec![
        CodeGenerationTestSuite::new(
            "script",
            ScriptGenerator,
            vec![CodeGenerationTestCase::new("number", ExpectedCode::exact("5"), |ws| {
                let block = number_block(ws, 5.0);
                Ok(ws.add(block))
            })],
        ),
        CodeGenerationTestSuite::new(
            "outline",
            OutlineGenerator,
            vec![CodeGenerationTestCase::new(
                "print tree",
                ExpectedCode::exact("text_print\n  text"),
                |ws| {
                    let value = text_block(ws, "hi");
                    let block = print_block(ws, value);
                    Ok(ws.add(block))
                },
            )],
        ),
    ];

    let report = try_run_code_generation_suites(&registry, suites);
    assert!(report.is_success(), "{}", report);
    assert_eq!(report.cases()[0].group, "script");
    assert_eq!(report.cases()[1].group, "outline");
}

#[test]
#[should_panic(expected = "1 failed")]
fn test_panicking_entry_point_reports_failures() {
    let registry = demo_registry();
    let suites = vec![CodeGenerationTestSuite::new(
        "script",
        ScriptGenerator,
        vec![CodeGenerationTestCase::new("wrong", ExpectedCode::exact("6"), |ws| {
            let block = number_block(ws, 5.0);
            Ok(ws.add(block))
        })],
    )];

    run_code_generation_suites(&registry, suites);
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_serialization_suite_round_trips_exactly() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "text block",
        r#"<block type="text"><field name="TEXT">hi</field></block>"#,
        |block| {
            if block.block_type() != "text" {
                return Err(format!("expected a text block, got {}", block.block_type()));
            }
            if block.field_value("TEXT") != Some(&FieldValue::text("hi")) {
                return Err("TEXT field was not preserved".to_string());
            }
            Ok(())
        },
    )];

    let report = try_run_serialization_suite(&registry, &cases);
    assert!(report.is_success(), "{}", report);
    // one case, two groups
    assert_eq!(report.len(), 2);
    assert_eq!(report.cases()[0].group, "xml_to_block");
    assert_eq!(report.cases()[1].group, "xml_round_trip");
}

#[test]
fn test_expected_xml_overrides_the_input() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "wrapper is dropped",
        r#"<xml>
             <block type="math_number">
                 <field name="NUM">5</field>
             </block>
           </xml>"#,
        |_| Ok(()),
    )
    .expecting_xml(r#"<block type="math_number"><field name="NUM">5</field></block>"#)];

    let report = try_run_serialization_suite(&registry, &cases);
    assert!(report.is_success(), "{}", report);
}

#[test]
fn test_structural_assertion_failure_only_fails_its_group() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "rejected structure",
        r#"<block type="text"><field name="TEXT">hi</field></block>"#,
        |_| Err("not what I wanted".to_string()),
    )];

    let report = try_run_serialization_suite(&registry, &cases);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 1);

    let failed = report.failures()[0];
    assert_eq!(failed.group, "xml_to_block");
    assert_eq!(
        failure_of(&failed.outcome),
        &CaseFailure::Structure("not what I wanted".to_string())
    );
}

#[test]
fn test_ids_from_source_xml_survive_the_round_trip() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "identified block",
        r#"<block type="text" id="abc"><field name="TEXT">hi</field></block>"#,
        |block| {
            if block.id().as_str() != "abc" {
                return Err(format!("id was {}", block.id()));
            }
            Ok(())
        },
    )];

    let report = try_run_serialization_suite(&registry, &cases);
    assert!(report.is_success(), "{}", report);
}

#[test]
fn test_round_trip_mismatch_is_reported_with_both_forms() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "wrong expectation",
        r#"<block type="text"><field name="TEXT">hi</field></block>"#,
        |_| Ok(()),
    )
    .expecting_xml(r#"<block type="text"><field name="TEXT">bye</field></block>"#)];

    let report = try_run_serialization_suite(&registry, &cases);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 1);

    let failed = report.failures()[0];
    assert_eq!(failed.group, "xml_round_trip");
    match failure_of(&failed.outcome) {
        CaseFailure::XmlMismatch { expected, actual } => {
            assert!(expected.contains("bye"));
            assert!(actual.contains("hi"));
        }
        other => panic!("expected an XML mismatch, got {:?}", other),
    }
}

#[test]
fn test_unparseable_case_fails_both_groups() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "unknown type",
        r#"<block type="mystery"/>"#,
        |_| Ok(()),
    )];

    let report = try_run_serialization_suite(&registry, &cases);
    assert_eq!(report.failed(), 2);
    for failed in report.failures() {
        assert!(matches!(
            failure_of(&failed.outcome),
            CaseFailure::Errored(_)
        ));
    }
}

#[test]
#[should_panic(expected = "xml_round_trip")]
fn test_panicking_serialization_entry_point() {
    let registry = demo_registry();
    let cases = vec![SerializationTestCase::new(
        "wrong expectation",
        r#"<block type="text"><field name="TEXT">hi</field></block>"#,
        |_| Ok(()),
    )
    .expecting_xml(r#"<block type="text"><field name="TEXT">bye</field></block>"#)];

    run_serialization_suite(&registry, &cases);
}
