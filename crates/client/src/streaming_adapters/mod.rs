//! Backend Stream Adapters
//!
//! Frame-level adapters converting the backend's SSE-style event frames into
//! unified `SearchStreamEvent`s.

pub mod perplexity;

pub use perplexity::{
    classify_frame, final_step_answer, BackendEvent, Block, MessagePayload, PerplexityAdapter,
    ResolutionState, NO_ANSWER,
};
