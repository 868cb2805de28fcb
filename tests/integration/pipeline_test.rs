//! Extraction Pipeline Integration Tests
//!
//! Drive the full frame-to-answer pipeline over synthetic backend response
//! bodies: split on the double-CRLF delimiter, classify and decode each
//! frame, fold the resolution state, and finalize with the documented
//! precedence. No network calls are made; the transport loop itself is
//! covered by the client crate's mock-server tests.

use pplx_bridge_client::{PerplexityAdapter, NO_ANSWER};
use pplx_bridge_core::streaming::{split_frames, FrameBuffer, SearchStreamEvent, StreamAdapter};

// ============================================================================
// Helpers
// ============================================================================

fn message_frame(payload: serde_json::Value) -> String {
    format!("event: message\r\ndata: {}\r\n\r\n", payload)
}

fn blocks_frame(texts: &[&str]) -> String {
    let blocks: Vec<serde_json::Value> =
        texts.iter().map(|t| serde_json::json!({"text": t})).collect();
    message_frame(serde_json::json!({ "blocks": blocks }))
}

fn terminal_frame(steps: serde_json::Value) -> String {
    message_frame(serde_json::json!({ "text": steps.to_string() }))
}

const END_FRAME: &str = "event: end_of_stream\r\n\r\n";

/// Run a whole response body through the pipeline in batch mode.
fn resolve_body(body: &str) -> String {
    let mut adapter = PerplexityAdapter::new();
    for frame in split_frames(body) {
        adapter.adapt(frame).unwrap();
    }
    adapter.finish()
}

/// Run a whole response body through the pipeline collecting streamed events.
fn stream_body(body: &str) -> (Vec<SearchStreamEvent>, String) {
    let mut adapter = PerplexityAdapter::new();
    let mut events = Vec::new();
    for frame in split_frames(body) {
        events.extend(adapter.adapt(frame).unwrap());
    }
    (events, adapter.finish())
}

// ============================================================================
// Batch mode
// ============================================================================

#[test]
fn test_growing_partials_resolve_to_last_block() {
    let body = format!(
        "{}{}{}",
        blocks_frame(&["Hel"]),
        blocks_frame(&["Hello world"]),
        END_FRAME
    );
    assert_eq!(resolve_body(&body), "Hello world");
}

#[test]
fn test_final_step_outranks_blocks() {
    let steps = serde_json::json!([
        {"step_type": "SEARCH", "content": {}},
        {"step_type": "ANSWER", "content": {"answer": "{\"answer\": \"decoy\"}"}},
        {"step_type": "FINAL", "content": {"answer": "{\"answer\": \"authoritative\"}"}}
    ]);
    let body = format!(
        "{}{}{}",
        blocks_frame(&["truncated partial"]),
        terminal_frame(steps),
        END_FRAME
    );
    assert_eq!(resolve_body(&body), "authoritative");
}

#[test]
fn test_no_resolvable_text_yields_sentinel() {
    let body = format!(
        "{}{}{}",
        message_frame(serde_json::json!({})),
        message_frame(serde_json::json!({"blocks": [{"no_text": true}]})),
        END_FRAME
    );
    assert_eq!(resolve_body(&body), NO_ANSWER);
}

#[test]
fn test_unparsable_steps_fall_back_to_blocks() {
    let body = format!(
        "{}{}{}",
        blocks_frame(&["from blocks"]),
        message_frame(serde_json::json!({"text": "this is not a steps array"})),
        END_FRAME
    );
    assert_eq!(resolve_body(&body), "from blocks");
}

#[test]
fn test_raw_answer_fallback_when_nested_parse_fails() {
    let steps = serde_json::json!([
        {"step_type": "FINAL", "content": {"answer": "plain, not JSON"}}
    ]);
    let body = format!("{}{}", terminal_frame(steps), END_FRAME);
    assert_eq!(resolve_body(&body), "plain, not JSON");
}

#[test]
fn test_malformed_and_unknown_frames_never_abort() {
    let body = format!(
        "{}{}{}{}{}",
        "event: ping\r\nid: 3\r\n\r\n",
        "event: message\r\ndata: {broken json\r\n\r\n",
        "\r\n\r\n",
        blocks_frame(&["still standing"]),
        END_FRAME
    );
    assert_eq!(resolve_body(&body), "still standing");
}

#[test]
fn test_transport_close_without_terminal_event() {
    // No end_of_stream frame at all: finalize from accumulated state.
    let body = blocks_frame(&["accumulated"]);
    assert_eq!(resolve_body(&body), "accumulated");
}

// ============================================================================
// Streaming mode
// ============================================================================

#[test]
fn test_streaming_emits_each_block_and_final_answer() {
    let steps = serde_json::json!([
        {"step_type": "FINAL", "content": {"answer": "{\"answer\": \"Hello world\"}"}}
    ]);
    let body = format!(
        "{}{}{}{}",
        blocks_frame(&["Hel"]),
        blocks_frame(&["Hello", "Hello wor"]),
        terminal_frame(steps),
        END_FRAME
    );

    let (events, answer) = stream_body(&body);
    assert_eq!(
        events,
        vec![
            SearchStreamEvent::AnswerDelta { content: "Hel".into() },
            SearchStreamEvent::AnswerDelta { content: "Hello".into() },
            SearchStreamEvent::AnswerDelta { content: "Hello wor".into() },
            SearchStreamEvent::FinalAnswer { content: "Hello world".into() },
            SearchStreamEvent::Complete,
        ]
    );
    assert_eq!(answer, "Hello world");
}

#[test]
fn test_streaming_from_chunked_transport() {
    // Feed the body through the frame buffer in awkward chunk sizes to
    // prove frame boundaries never depend on chunk boundaries.
    let steps = serde_json::json!([
        {"step_type": "FINAL", "content": {"answer": "{\"answer\": \"chunked ok\"}"}}
    ]);
    let body = format!(
        "{}{}{}",
        blocks_frame(&["chunk"]),
        terminal_frame(steps),
        END_FRAME
    );

    let mut buffer = FrameBuffer::new();
    let mut adapter = PerplexityAdapter::new();
    let mut events = Vec::new();

    for chunk in body.as_bytes().chunks(7) {
        buffer.push(chunk);
        while let Some(frame) = buffer.next_frame() {
            events.extend(adapter.adapt(&frame).unwrap());
        }
    }
    if let Some(frame) = buffer.take_remainder() {
        events.extend(adapter.adapt(&frame).unwrap());
    }

    assert_eq!(events.last(), Some(&SearchStreamEvent::Complete));
    assert_eq!(adapter.finish(), "chunked ok");
}
