//! Free-Text JSON Recovery
//!
//! The backend sometimes wraps otherwise-structured output in conversational
//! prose ("Sure, here is the data: {...} Thanks."). When a caller expects a
//! structured payload, this scanner looks for balanced `{...}` / `[...]`
//! spans in the answer text, keeps the candidates that actually parse as
//! JSON, and substitutes the longest one.
//!
//! The scanner recovers the best candidate substring only; it does not
//! guarantee schema conformance of the recovered JSON.

use serde_json::Value;

/// Find every maximal balanced `{...}` / `[...]` span in `text`.
///
/// Explicit stack-based matcher: nesting is tracked exactly, where a regex
/// approximation is fragile beyond a fixed depth. The scan is purely
/// structural; brackets inside string literals are not special-cased here,
/// and candidates the structural scan gets wrong simply fail the parse
/// check and are discarded.
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut stack: Vec<u8> = Vec::new();
    let mut start = 0usize;

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'{' | b'[' => {
                if stack.is_empty() {
                    start = i;
                }
                stack.push(b);
            }
            b'}' | b']' => {
                let opener = if b == b'}' { b'{' } else { b'[' };
                if stack.last() == Some(&opener) {
                    stack.pop();
                    if stack.is_empty() {
                        spans.push((start, i + 1));
                    }
                } else if !stack.is_empty() {
                    // Mismatched closer: the pending span cannot balance.
                    stack.clear();
                }
                // A closer with no opener pending is plain text; skip it.
            }
            _ => {}
        }
    }

    spans
}

/// Extract the best JSON candidate from text that may contain conversational
/// wrappers.
///
/// Among all balanced spans, the longest one that parses as JSON wins (ties
/// broken by first occurrence) and is returned verbatim, internal formatting
/// preserved. If no candidate parses, the input is returned unchanged. Never
/// panics on malformed input.
pub fn extract_json(text: &str) -> &str {
    // Already pure JSON: hand it back byte-for-byte.
    if serde_json::from_str::<Value>(text).is_ok() {
        return text;
    }

    let mut best: Option<&str> = None;
    for (start, end) in balanced_spans(text) {
        let candidate = &text[start..end];
        if serde_json::from_str::<Value>(candidate).is_err() {
            continue;
        }
        if best.is_none_or(|b| candidate.len() > b.len()) {
            best = Some(candidate);
        }
    }

    best.unwrap_or(text)
}

/// Caller-selected recovery gate: apply [`extract_json`] only when the
/// caller's contract expects structured output.
pub fn recover_structured(text: &str, expects_json: bool) -> &str {
    if expects_json {
        extract_json(text)
    } else {
        text
    }
}
