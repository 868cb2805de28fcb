//! Unified Stream Event Types
//!
//! Backend-agnostic event types and adapter trait for processing the search
//! backend's server-push responses, plus the frame splitter that slices the
//! raw transport stream into discrete event frames. These types are shared
//! across the client crate (backend adapter) and the main crate (HTTP bridge).

use serde::{Deserialize, Serialize};

/// Delimiter separating event frames in the backend's response body.
///
/// The backend frames its HTTP response as SSE-style events separated by a
/// double CRLF pair.
pub const FRAME_DELIMITER: &str = "\r\n\r\n";

/// Unified streaming event produced while extracting an answer from one
/// backend request. This provides a consistent interface for callers
/// regardless of how the backend framed the underlying response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchStreamEvent {
    /// Incremental unit of answer text from a partial-answer block.
    /// The backend resends growing partials rather than deltas, so each
    /// unit supersedes the previous one.
    AnswerDelta { content: String },

    /// Authoritative final answer resolved from a terminal steps structure
    FinalAnswer { content: String },

    /// Stream complete (terminal event observed)
    Complete,

    /// Transport error surfaced mid-stream
    Error { message: String },
}

/// Errors that can occur during stream adaptation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AdapterError {
    /// Invalid format that couldn't be parsed
    InvalidFormat(String),
    /// JSON/data parsing error
    ParseError(String),
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            AdapterError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Trait for adapting backend-specific event frames to unified events.
///
/// One frame in, zero or more events out. Adapters hold per-request state
/// only; each in-flight request owns its own adapter instance.
pub trait StreamAdapter: Send + Sync {
    /// Returns the backend name for logging and identification.
    fn provider_name(&self) -> &'static str;

    /// Adapt one raw event frame to unified events.
    ///
    /// Frames the adapter cannot interpret yield an empty vec; they must
    /// never abort the stream.
    fn adapt(&mut self, frame: &str) -> Result<Vec<SearchStreamEvent>, AdapterError>;

    /// Reset adapter state for a new stream.
    fn reset(&mut self) {
        // Default implementation does nothing
    }
}

/// Split a complete response body into an ordered, lazy sequence of frames.
///
/// No validation of frame content: empty or malformed frames are passed
/// through unchanged to the classifier.
pub fn split_frames(body: &str) -> impl Iterator<Item = &str> {
    body.split(FRAME_DELIMITER)
}

/// Accumulates raw transport chunks and yields complete event frames.
///
/// The transport delivers bytes with no regard for frame boundaries; a frame
/// may span several chunks and one chunk may carry several frames. `push`
/// appends a chunk, `next_frame` pops the earliest complete frame, and
/// `take_remainder` drains the unterminated tail once the transport closes.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Append a raw chunk from the transport (lossy UTF-8).
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.push_str(&String::from_utf8_lossy(chunk));
    }

    /// Pop the earliest complete frame, if its delimiter has arrived.
    pub fn next_frame(&mut self) -> Option<String> {
        let end = self.buf.find(FRAME_DELIMITER)?;
        let frame = self.buf[..end].to_string();
        self.buf.drain(..end + FRAME_DELIMITER.len());
        Some(frame)
    }

    /// Drain whatever is buffered after the transport closed without a
    /// trailing delimiter. Returns `None` if nothing is pending.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }
}
