//! Envelope decoder for the server-sent event stream.
//!
//! Each event line of interest looks like
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"{\"type\":\"mo"}}]}
//! ```
//!
//! The decoder strips the `data:` prefix, parses the envelope document, and
//! pulls out the nested delta text. That text is a fragment of the command
//! document and is passed on verbatim; fragment boundaries inside it carry
//! no meaning. Both the chat-completions delta shape and the messages-API
//! `content_block_delta` shape are understood.
//!
//! The terminal sentinel is found by substring search over each raw line,
//! so a delta whose text happens to contain `[DONE]` also ends the stream.

#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;

use serde_json::Value;
use tracing::{debug, warn};

/// Literal payload marking the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Messages-API event type that closes the stream.
const MESSAGE_STOP: &str = "message_stop";

/// One decoded unit of the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeEvent {
    /// Delta text to append to the command document.
    Delta(String),
    /// The stream is finished; no further data follows.
    Done,
}

/// Stateful decoder for one stream. Emits [`EnvelopeEvent::Done`] at most once.
#[derive(Debug, Default)]
pub struct EnvelopeDecoder {
    done: bool,
}

impl EnvelopeDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a unit of raw event text.
    ///
    /// Lines are handled in order. The first line containing the sentinel
    /// yields [`EnvelopeEvent::Done`] and the rest of the unit is ignored, as
    /// is every later call.
    pub fn feed(&mut self, raw: &str) -> Vec<EnvelopeEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        for line in raw.lines() {
            if line.contains(DONE_SENTINEL) {
                self.finish(&mut events);
                break;
            }
            let Some(payload) = data_payload(line) else {
                continue;
            };
            if payload.is_empty() {
                continue;
            }

            let doc = match serde_json::from_str::<Value>(payload) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(error = %e, payload, "sse: undecodable data payload");
                    continue;
                }
            };
            if is_message_stop(&doc) {
                self.finish(&mut events);
                break;
            }
            if let Some(text) = delta_text(&doc) {
                if !text.is_empty() {
                    events.push(EnvelopeEvent::Delta(text.to_owned()));
                }
            }
        }
        events
    }

    /// Whether the terminal event has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self, events: &mut Vec<EnvelopeEvent>) {
        debug!("sse: stream finished");
        self.done = true;
        events.push(EnvelopeEvent::Done);
    }
}

/// The payload of a `data:` line, with the optional single leading space removed.
///
/// Returns `None` for event-type, id, comment, and blank lines.
fn data_payload(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let value = line.strip_prefix("data:")?;
    Some(value.strip_prefix(' ').unwrap_or(value).trim_end())
}

/// Delta text nested in a streaming envelope, if any.
#[must_use]
pub fn delta_text(doc: &Value) -> Option<&str> {
    doc.pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .or_else(|| doc.pointer("/delta/text").and_then(Value::as_str))
}

fn is_message_stop(doc: &Value) -> bool {
    doc.get("type").and_then(Value::as_str) == Some(MESSAGE_STOP)
}
