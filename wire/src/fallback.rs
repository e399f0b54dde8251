//! Non-streaming response parsing.
//!
//! When streaming is unavailable the provider answers with one document whose
//! text field holds the whole `{"commands":[...]}` document as a string,
//! sometimes wrapped in a Markdown code fence.

#[cfg(test)]
#[path = "fallback_test.rs"]
mod tests;

use serde_json::Value;

use crate::command::{DrawingCommand, SchemaError, validate_batch};

/// Parse a complete provider response body into validated commands.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidJson`] if either the body or the embedded
/// document is not JSON, [`SchemaError::MissingContent`] if the body has no
/// text field, and the [`validate_batch`] errors for a document without a
/// `commands` array.
pub fn parse_fallback_response(body: &str) -> Result<Vec<DrawingCommand>, SchemaError> {
    let doc: Value = serde_json::from_str(body)
        .map_err(|e| SchemaError::InvalidJson { reason: e.to_string(), raw: body.to_owned() })?;
    let Some(text) = response_text(&doc) else {
        return Err(SchemaError::MissingContent { raw: body.to_owned() });
    };
    parse_command_document(text)
}

/// Parse a bare command document, stripping a surrounding code fence.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidJson`] for unparsable text and the
/// [`validate_batch`] errors otherwise.
pub fn parse_command_document(text: &str) -> Result<Vec<DrawingCommand>, SchemaError> {
    let inner = strip_code_fence(text);
    let doc: Value = serde_json::from_str(inner)
        .map_err(|e| SchemaError::InvalidJson { reason: e.to_string(), raw: text.to_owned() })?;
    validate_batch(&doc)
}

/// The textual content of a non-streaming response.
///
/// Looks at `choices[0].message.content` first, then the first `text` block
/// of a messages-API `content` array.
#[must_use]
pub fn response_text(doc: &Value) -> Option<&str> {
    if let Some(text) = doc.pointer("/choices/0/message/content").and_then(Value::as_str) {
        return Some(text);
    }
    doc.get("content")
        .and_then(Value::as_array)?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .find_map(|block| block.get("text").and_then(Value::as_str))
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` line and a trailing fence.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
