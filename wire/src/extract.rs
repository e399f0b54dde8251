//! Fragment-tolerant object extractor.
//!
//! The upstream document is `{"commands":[{...},{...},...]}`, produced strictly
//! left to right and delivered in arbitrary fragments. [`ObjectExtractor`]
//! buffers the text, skips everything before the `commands` array, and then
//! emits each balanced `{...}` span as soon as its closing brace arrives.
//!
//! Brace depth is tracked outside string literals only, and a backslash
//! always consumes the next character, so braces and quotes inside string
//! values never disturb the scan. A span that fails to parse is logged and
//! skipped; the stream carries on.

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::command::{COMMANDS_KEY, CommandKind};

/// Once the consumed prefix grows past this many bytes it is dropped.
pub const PRUNE_THRESHOLD: usize = 1000;

/// Counters for spans the extractor declined to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Spans whose exact text was already emitted.
    pub duplicates: usize,
    /// Balanced spans that were not valid JSON.
    pub malformed: usize,
    /// Parsed objects with a missing or unknown `type` tag.
    pub unrecognized: usize,
}

/// Parser state for one in-flight stream. Never reuse across requests.
#[derive(Debug, Default)]
pub struct ObjectExtractor {
    buffer: String,
    /// Byte offset of the first unconsumed character in `buffer`.
    offset: usize,
    in_array: bool,
    seen: HashSet<String>,
    emitted: usize,
    stats: ExtractStats,
}

impl ObjectExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and emit every object it completes, in order.
    ///
    /// Returns the number of objects emitted by this call. A fragment that
    /// ends mid-object simply leaves the tail buffered for the next call.
    pub fn feed(&mut self, fragment: &str, mut emit: impl FnMut(Value)) -> usize {
        self.buffer.push_str(fragment);

        if !self.in_array {
            let Some(start) = find_array_start(&self.buffer) else {
                return 0;
            };
            self.buffer.drain(..start);
            self.offset = 0;
            self.in_array = true;
            debug!("extract: entered commands array");
        }

        let mut count = 0;
        while let Some(rel) = self.buffer[self.offset..].find('{') {
            let start = self.offset + rel;
            let Some(len) = balanced_span_len(&self.buffer.as_bytes()[start..]) else {
                break;
            };
            let end = start + len;
            let span = self.buffer[start..end].to_owned();
            self.offset = end;

            if let Some(value) = self.accept(span) {
                emit(value);
                count += 1;
            }
        }

        if self.offset > PRUNE_THRESHOLD {
            self.buffer.drain(..self.offset);
            self.offset = 0;
        }
        count
    }

    /// Whether the `commands` array marker has been seen.
    #[must_use]
    pub fn in_array(&self) -> bool {
        self.in_array
    }

    /// Total objects emitted so far.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Bytes held in the buffer, consumed prefix included.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes not yet consumed by a complete object.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer[self.offset..]
    }

    #[must_use]
    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    fn accept(&mut self, span: String) -> Option<Value> {
        let value = match serde_json::from_str::<Value>(&span) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, span = %span, "extract: skipping malformed object");
                self.stats.malformed += 1;
                return None;
            }
        };

        let recognized = value
            .get("type")
            .and_then(Value::as_str)
            .and_then(CommandKind::from_tag)
            .is_some();
        if !recognized {
            debug!(span = %span, "extract: skipping object without a known type");
            self.stats.unrecognized += 1;
            return None;
        }

        if !self.seen.insert(span) {
            self.stats.duplicates += 1;
            return None;
        }
        self.emitted += 1;
        Some(value)
    }
}

/// Locate the array opened by the `"commands"` key.
///
/// Returns the byte index just past the `[`. Whitespace is allowed around
/// the colon. `None` means the marker is absent or not yet complete.
fn find_array_start(buffer: &str) -> Option<usize> {
    let marker = format!("\"{COMMANDS_KEY}\"");
    let mut from = 0;
    while let Some(rel) = buffer[from..].find(&marker) {
        let after_key = from + rel + marker.len();
        let rest = buffer[after_key..].trim_start();
        if let Some(value) = rest.strip_prefix(':') {
            let value = value.trim_start();
            if value.starts_with('[') {
                return Some(buffer.len() - value.len() + 1);
            }
            if value.is_empty() {
                return None;
            }
        } else if rest.is_empty() {
            return None;
        }
        from = after_key;
    }
    None
}

/// Length of the balanced `{...}` span starting at `bytes[0]`.
///
/// Returns `None` while the closing brace has not arrived yet.
fn balanced_span_len(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
