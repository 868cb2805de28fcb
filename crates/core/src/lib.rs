//! pplx-bridge Core
//!
//! Foundational types for the pplx-bridge workspace: unified stream events,
//! the stream adapter trait, the event-frame splitter, and the free-text JSON
//! recovery scanner. This crate has zero dependencies on application-level
//! code (HTTP server, backend client, key storage).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `streaming` - Unified stream event types, adapter trait, and frame buffer
//! - `recovery` - Balanced-span JSON recovery from conversational text
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Pure, independently testable functions** - classification, splitting, and
//!    recovery have no side effects and no shared state
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod recovery;
pub mod streaming;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::{
    split_frames, AdapterError, FrameBuffer, SearchStreamEvent, StreamAdapter, FRAME_DELIMITER,
};

// ── JSON Recovery ──────────────────────────────────────────────────────
pub use recovery::{extract_json, recover_structured};
