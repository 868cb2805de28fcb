//! JSON Recovery Acceptance Tests
//!
//! The scanner's contract as the HTTP layer depends on it: identity on
//! prose and on pure JSON, longest-parsable-span selection, and the
//! structured-output gate.

use pplx_bridge_core::recovery::{extract_json, recover_structured};

#[test]
fn test_prose_without_json_is_identity() {
    let input = "The capital of France is Paris, founded around 250 BC.";
    assert_eq!(extract_json(input), input);
}

#[test]
fn test_pure_json_is_byte_identical() {
    let input = r#"{"title": "Build a component", "dependencies": [1, 3]}"#;
    assert_eq!(extract_json(input), input);
}

#[test]
fn test_conversational_wrapper_recovery() {
    let input = r#"Sure, here is the data: {"a":1,"nested":{"b":[1,2]}} Thanks."#;
    assert_eq!(extract_json(input), r#"{"a":1,"nested":{"b":[1,2]}}"#);
}

#[test]
fn test_task_definition_recovery() {
    // A realistic backend answer: explanation, blank line, then the payload.
    let input = concat!(
        "I can craft a comprehensive task for your project based on current ",
        "best practices. Assumptions: the component should be lightweight.\n\n",
        "{\n",
        "  \"title\": \"Build a real-time crypto price display component\",\n",
        "  \"details\": \"Implementation details here...\",\n",
        "  \"dependencies\": [1, 3]\n",
        "}"
    );

    let extracted = extract_json(input);
    let parsed: serde_json::Value = serde_json::from_str(extracted).unwrap();
    assert_eq!(
        parsed["title"],
        "Build a real-time crypto price display component"
    );
    assert_eq!(parsed["dependencies"], serde_json::json!([1, 3]));
    // The span is returned verbatim, formatting preserved.
    assert!(extracted.starts_with("{\n  \"title\""));
}

#[test]
fn test_longest_of_two_parsable_spans_wins() {
    let input = r#"ids [1,2] and payload {"a":1,"b":{"c":2}} follow"#;
    assert_eq!(extract_json(input), r#"{"a":1,"b":{"c":2}}"#);
}

#[test]
fn test_gate_respects_caller_contract() {
    let input = r#"wrapped {"x": 1} text"#;
    assert_eq!(recover_structured(input, true), r#"{"x": 1}"#);
    assert_eq!(recover_structured(input, false), input);
}
