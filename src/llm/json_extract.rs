//! Tolerant JSON recovery from free-text model output.
//!
//! Models wrap JSON in prose, markdown fences or trailing commentary. The
//! extractor tries increasingly loose strategies and returns the first value
//! that parses:
//!
//! 1. the trimmed input as-is
//! 2. the input with code fence markers removed
//! 3. the first brace-delimited candidate of each scan pattern
//! 4. every candidate with one level of nested braces, in order
//!
//! All scanning goes through the `regex` crate, which matches in linear
//! time, so hostile input cannot trigger catastrophic backtracking.
//!
//! Parsing keeps `serde_json`'s recursion limit: documents nested deeper
//! than [`MAX_NESTING_DEPTH`] levels are rejected rather than risking a
//! stack overflow on untrusted model output.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Deepest array/object nesting `serde_json` accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Opening fence with an optional `json` tag.
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*\n?").unwrap_or_else(|_| unreachable!()));

/// Shortest `{ ... }` span.
static SHORTEST_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*?\}").unwrap_or_else(|_| unreachable!()));

/// Object whose members may contain flat nested objects.
static NESTED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").unwrap_or_else(|_| unreachable!())
});

/// Same depth limit, alternation form.
static NESTED_OBJECT_ALT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(?:[^{}]|\{[^{}]*\})*\}").unwrap_or_else(|_| unreachable!()));

/// Extracts the first parseable JSON value from `text`.
///
/// # Errors
///
/// Returns [`Error::Parse`] when no strategy yields valid JSON, including for
/// empty input.
pub fn extract_json(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    let cleaned = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str(cleaned.trim()) {
        return Ok(value);
    }

    for pattern in [&*SHORTEST_OBJECT, &*NESTED_OBJECT, &*NESTED_OBJECT_ALT] {
        if let Some(found) = pattern.find(&cleaned) {
            if let Ok(value) = serde_json::from_str(found.as_str()) {
                return Ok(value);
            }
        }
    }

    NESTED_OBJECT
        .find_iter(&cleaned)
        .find_map(|candidate| serde_json::from_str(candidate.as_str()).ok())
        .ok_or_else(|| Error::Parse("no valid JSON found".to_string()))
}

/// Removes markdown code fence markers, keeping the fenced content.
fn strip_code_fences(text: &str) -> String {
    FENCE_OPEN.replace_all(text, "").replace("```", "")
}
