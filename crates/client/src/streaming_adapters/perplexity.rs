//! Perplexity Stream Adapter
//!
//! Classifies the backend's event frames, decodes message payloads, and
//! resolves the best-known answer across a stream of partial updates.
//!
//! The backend's framing is known to be inconsistent: payload fields are
//! optional, the terminal steps structure is double-JSON-encoded, and
//! malformed frames appear mid-stream. Local decode failures are swallowed
//! here; a best-effort answer beats failing the whole request.

use pplx_bridge_core::streaming::{AdapterError, SearchStreamEvent, StreamAdapter};
use serde::Deserialize;

/// Sentinel returned when a stream ends with no resolvable answer.
/// A valid (if unhelpful) result, not an error.
pub const NO_ANSWER: &str = "No answer received";

const MESSAGE_PREFIX: &str = "event: message\r\n";
const DATA_MARKER: &str = "data: ";
const END_OF_STREAM_PREFIX: &str = "event: end_of_stream";

/// The step tag carrying the authoritative concluding answer. The answer
/// lives in the FINAL step, not the ANSWER step, despite the name.
const FINAL_STEP: &str = "FINAL";

/// One frame, classified and decoded.
#[derive(Debug)]
pub enum BackendEvent {
    /// `event: message` frame with a decoded payload
    Message(MessagePayload),
    /// `event: end_of_stream` terminal frame
    EndOfStream,
    /// Anything else, including frames whose payload failed to decode
    Unknown,
}

/// Decoded payload of a `message` frame.
///
/// Fields are optional by backend convention: a payload may carry blocks,
/// the terminal `text`, both, or neither.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// JSON-encoded string holding the terminal `steps` array;
    /// conventionally present only on the final payload before
    /// `end_of_stream`.
    #[serde(default)]
    pub text: Option<String>,
}

/// One incremental partial-answer fragment. The backend resends growing
/// partials rather than deltas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub text: Option<String>,
}

/// Entry of the terminal `steps` structure.
#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    step_type: Option<String>,
    #[serde(default)]
    content: Option<StepContent>,
}

#[derive(Debug, Deserialize)]
struct StepContent {
    /// JSON-encoded string holding `{"answer": "..."}`
    #[serde(default)]
    answer: Option<String>,
}

/// Classify one raw frame and decode its payload.
///
/// Pure function of the frame text. A `message` frame whose payload fails
/// JSON decoding is reclassified as `Unknown`; not fatal, the frame is
/// simply ignored downstream.
pub fn classify_frame(frame: &str) -> BackendEvent {
    if let Some(rest) = frame.strip_prefix(MESSAGE_PREFIX) {
        let Some(payload) = rest.strip_prefix(DATA_MARKER) else {
            return BackendEvent::Unknown;
        };
        match serde_json::from_str::<MessagePayload>(payload) {
            Ok(payload) => BackendEvent::Message(payload),
            Err(_) => BackendEvent::Unknown,
        }
    } else if frame.starts_with(END_OF_STREAM_PREFIX) {
        BackendEvent::EndOfStream
    } else {
        BackendEvent::Unknown
    }
}

/// Terminal path of the resolver: extract the authoritative answer from the
/// JSON-encoded `steps` array found in a payload's `text` field.
///
/// Returns `None` when the array does not decode or holds no `FINAL` step.
/// Otherwise resolves the first `FINAL` step's `content.answer`: nested
/// `{"answer": ...}` decoding when it parses, the raw string when it does
/// not, and the empty string when the field is absent.
pub fn final_step_answer(steps_json: &str) -> Option<String> {
    let steps: Vec<Step> = serde_json::from_str(steps_json).ok()?;
    let step = steps
        .iter()
        .find(|s| s.step_type.as_deref() == Some(FINAL_STEP))?;

    let Some(raw) = step.content.as_ref().and_then(|c| c.answer.as_ref()) else {
        return Some(String::new());
    };

    // The answer field is itself a JSON-encoded {"answer": "..."} document.
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => match value.get("answer").and_then(|a| a.as_str()) {
            Some(answer) => Some(answer.to_string()),
            None => Some(raw.clone()),
        },
        Err(_) => Some(raw.clone()),
    }
}

/// Mutable accumulator for one request: the last block text observed and the
/// final answer from a confirmed `FINAL` step. Created at request start,
/// folded over each decoded payload, consumed at stream end.
#[derive(Debug, Default)]
pub struct ResolutionState {
    last_block_text: Option<String>,
    final_answer: Option<String>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded payload into the state, returning the stream events
    /// it produces.
    ///
    /// Block path and terminal path both run when present: every block
    /// carrying text overwrites `last_block_text` (last-wins within the
    /// payload and across the stream) and emits an `AnswerDelta`; a payload
    /// `text` that resolves through a `FINAL` step pins the final answer and
    /// emits `FinalAnswer`.
    pub fn observe(&mut self, payload: &MessagePayload) -> Vec<SearchStreamEvent> {
        let mut events = Vec::new();

        for block in &payload.blocks {
            if let Some(text) = &block.text {
                self.last_block_text = Some(text.clone());
                events.push(SearchStreamEvent::AnswerDelta {
                    content: text.clone(),
                });
            }
        }

        if let Some(steps_json) = &payload.text {
            if let Some(answer) = final_step_answer(steps_json) {
                events.push(SearchStreamEvent::FinalAnswer {
                    content: answer.clone(),
                });
                self.final_answer = Some(answer);
            }
        }

        events
    }

    /// Finalize at stream end.
    ///
    /// The terminal step is the backend's authoritative final answer, while
    /// block text is possibly-truncated incremental rendering: a non-empty
    /// final answer wins, then the last block text, then the sentinel.
    pub fn finalize(self) -> String {
        if let Some(answer) = self.final_answer {
            if !answer.is_empty() {
                return answer;
            }
        }
        match self.last_block_text {
            Some(text) if !text.is_empty() => text,
            _ => NO_ANSWER.to_string(),
        }
    }
}

/// Adapter folding the backend's event frames into unified events.
pub struct PerplexityAdapter {
    state: ResolutionState,
}

impl PerplexityAdapter {
    pub fn new() -> Self {
        Self {
            state: ResolutionState::new(),
        }
    }

    /// Consume the adapter and finalize the accumulated state into the
    /// answer string.
    pub fn finish(self) -> String {
        self.state.finalize()
    }
}

impl Default for PerplexityAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAdapter for PerplexityAdapter {
    fn provider_name(&self) -> &'static str {
        "perplexity"
    }

    fn adapt(&mut self, frame: &str) -> Result<Vec<SearchStreamEvent>, AdapterError> {
        match classify_frame(frame) {
            BackendEvent::Message(payload) => Ok(self.state.observe(&payload)),
            BackendEvent::EndOfStream => Ok(vec![SearchStreamEvent::Complete]),
            BackendEvent::Unknown => Ok(vec![]),
        }
    }

    fn reset(&mut self) {
        self.state = ResolutionState::new();
    }
}
