//! Drawing commands: the closed primitive set and its validator.
//!
//! Raw objects arrive as `serde_json::Value`s whose `type` tag names one of
//! five primitives. [`validate`] maps a raw object onto [`DrawingCommand`],
//! clamping every numeric field into canvas bounds. Out-of-range numbers are
//! never rejected; only objects that are not objects, carry no known tag, or
//! lack a numeric field are turned away, and those rejections are soft.
//!
//! [`validate_batch`] is the whole-document variant used by the non-streaming
//! path. A document without a `commands` array is a hard [`SchemaError`].

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Key under which the command array lives in the response document.
pub const COMMANDS_KEY: &str = "commands";

/// Smallest coordinate on the logical canvas.
pub const COORD_MIN: i32 = 0;
/// Largest coordinate on the logical canvas.
pub const COORD_MAX: i32 = 1000;
/// Smallest circle radius; non-positive radii are floored here.
pub const RADIUS_MIN: i32 = 1;
/// Largest circle radius.
pub const RADIUS_MAX: i32 = 500;

// =============================================================================
// ERRORS
// =============================================================================

/// Hard failure for a whole response document.
///
/// Every variant carries the offending raw text for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The document could not be parsed as JSON at all.
    #[error("response is not valid JSON: {reason}")]
    InvalidJson { reason: String, raw: String },

    /// The response envelope carried no textual content field.
    #[error("response carries no text content")]
    MissingContent { raw: String },

    /// The document has no `commands` key.
    #[error("document has no `commands` key")]
    MissingCommands { raw: String },

    /// The `commands` key is present but is not an array.
    #[error("`commands` is not an array")]
    CommandsNotArray { raw: String },
}

impl SchemaError {
    /// The raw text that failed validation.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::InvalidJson { raw, .. }
            | Self::MissingContent { raw }
            | Self::MissingCommands { raw }
            | Self::CommandsNotArray { raw } => raw,
        }
    }
}

/// Why a single raw object was dropped. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The value is not a JSON object.
    #[error("not an object")]
    NotAnObject,

    /// The object has no string `type` field.
    #[error("missing `type` tag")]
    MissingTag,

    /// The `type` tag names no known primitive.
    #[error("unknown command type `{0}`")]
    UnknownTag(String),

    /// A field required by the variant is absent or not a number.
    #[error("`{kind}` requires numeric field `{field}`")]
    InvalidField { kind: &'static str, field: &'static str },
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Tag of a drawing primitive, as it appears in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MoveTo,
    LineTo,
    QuadTo,
    CubicTo,
    AddCircle,
}

impl CommandKind {
    /// Map a wire tag onto a kind. Tags are case-sensitive.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "moveTo" => Some(Self::MoveTo),
            "lineTo" => Some(Self::LineTo),
            "quadTo" => Some(Self::QuadTo),
            "cubicTo" => Some(Self::CubicTo),
            "addCircle" => Some(Self::AddCircle),
            _ => None,
        }
    }

    /// The wire tag for this kind.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::MoveTo => "moveTo",
            Self::LineTo => "lineTo",
            Self::QuadTo => "quadTo",
            Self::CubicTo => "cubicTo",
            Self::AddCircle => "addCircle",
        }
    }
}

/// A validated drawing primitive. All fields are already clamped.
///
/// Only `Serialize` is derived: the sole way in is [`validate`], so no
/// unclamped value can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawingCommand {
    /// Start a new sub-path at `(x, y)`.
    MoveTo { x: i32, y: i32 },
    /// Straight segment to `(x, y)`.
    LineTo { x: i32, y: i32 },
    /// Quadratic curve with control `(x1, y1)` ending at `(x2, y2)`.
    QuadTo { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// Cubic curve with controls `(x1, y1)`, `(x2, y2)` ending at `(x3, y3)`.
    CubicTo { x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32 },
    /// Closed circle centred on `(cx, cy)`.
    AddCircle { cx: i32, cy: i32, radius: i32 },
}

impl DrawingCommand {
    /// The primitive kind of this command.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::MoveTo { .. } => CommandKind::MoveTo,
            Self::LineTo { .. } => CommandKind::LineTo,
            Self::QuadTo { .. } => CommandKind::QuadTo,
            Self::CubicTo { .. } => CommandKind::CubicTo,
            Self::AddCircle { .. } => CommandKind::AddCircle,
        }
    }

    /// Build a `moveTo`, clamping the coordinates.
    #[must_use]
    pub fn move_to(x: i32, y: i32) -> Self {
        Self::MoveTo { x: clamp_coord(x), y: clamp_coord(y) }
    }

    /// Build a `lineTo`, clamping the coordinates.
    #[must_use]
    pub fn line_to(x: i32, y: i32) -> Self {
        Self::LineTo { x: clamp_coord(x), y: clamp_coord(y) }
    }
}

fn clamp_coord(v: i32) -> i32 {
    v.clamp(COORD_MIN, COORD_MAX)
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Map one raw object onto a [`DrawingCommand`].
///
/// # Errors
///
/// Returns a [`Rejection`] when the value is not an object, has no known
/// `type` tag, or lacks a numeric field the variant needs. Numbers outside
/// canvas bounds are clamped, never rejected.
pub fn validate(raw: &Value) -> Result<DrawingCommand, Rejection> {
    let Some(obj) = raw.as_object() else {
        return Err(Rejection::NotAnObject);
    };
    let Some(tag) = obj.get("type").and_then(Value::as_str) else {
        return Err(Rejection::MissingTag);
    };
    let Some(kind) = CommandKind::from_tag(tag) else {
        return Err(Rejection::UnknownTag(tag.to_owned()));
    };

    let fields = Fields { obj, kind };
    let command = match kind {
        CommandKind::MoveTo => DrawingCommand::MoveTo {
            x: fields.coord("x")?,
            y: fields.coord("y")?,
        },
        CommandKind::LineTo => DrawingCommand::LineTo {
            x: fields.coord("x")?,
            y: fields.coord("y")?,
        },
        CommandKind::QuadTo => DrawingCommand::QuadTo {
            x1: fields.coord("x1")?,
            y1: fields.coord("y1")?,
            x2: fields.coord("x2")?,
            y2: fields.coord("y2")?,
        },
        CommandKind::CubicTo => DrawingCommand::CubicTo {
            x1: fields.coord("x1")?,
            y1: fields.coord("y1")?,
            x2: fields.coord("x2")?,
            y2: fields.coord("y2")?,
            x3: fields.coord("x3")?,
            y3: fields.coord("y3")?,
        },
        CommandKind::AddCircle => DrawingCommand::AddCircle {
            cx: fields.coord("cx")?,
            cy: fields.coord("cy")?,
            radius: fields.number("radius", RADIUS_MIN, RADIUS_MAX)?,
        },
    };
    Ok(command)
}

/// Validate a whole `{"commands":[...]}` document.
///
/// Objects that fail [`validate`] are dropped and logged; the batch as a
/// whole only fails when the array itself is missing.
///
/// # Errors
///
/// Returns [`SchemaError::MissingCommands`] or
/// [`SchemaError::CommandsNotArray`] with the serialized document attached.
pub fn validate_batch(doc: &Value) -> Result<Vec<DrawingCommand>, SchemaError> {
    let Some(field) = doc.get(COMMANDS_KEY) else {
        return Err(SchemaError::MissingCommands { raw: doc.to_string() });
    };
    let Some(items) = field.as_array() else {
        return Err(SchemaError::CommandsNotArray { raw: doc.to_string() });
    };

    let mut commands = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match validate(item) {
            Ok(command) => commands.push(command),
            Err(reason) => debug!(index, %reason, "validate: dropped batch item"),
        }
    }
    Ok(commands)
}

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    kind: CommandKind,
}

impl Fields<'_> {
    fn coord(&self, field: &'static str) -> Result<i32, Rejection> {
        self.number(field, COORD_MIN, COORD_MAX)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn number(&self, field: &'static str, min: i32, max: i32) -> Result<i32, Rejection> {
        let value = self
            .obj
            .get(field)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .ok_or(Rejection::InvalidField { kind: self.kind.tag(), field })?;
        // Bounded by the clamp, so the cast cannot truncate.
        Ok(value.round().clamp(f64::from(min), f64::from(max)) as i32)
    }
}
