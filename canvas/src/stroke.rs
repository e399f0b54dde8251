//! Strokes: the atomic, undoable unit of drawing.
//!
//! A [`LiveStroke`] grows one command at a time while a turn streams in or a
//! gesture is in progress. Sealing it produces a [`Stroke`], whose commands,
//! colour, width, and path can no longer change. Each stroke owns its own
//! `BezPath`; paths are never shared between strokes.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use kurbo::BezPath;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wire::DrawingCommand;

use crate::consts::{DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_WIDTH};
use crate::path;

/// Unique identifier for a sealed stroke.
pub type StrokeId = Uuid;

/// Who produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeSource {
    /// A freehand gesture.
    User,
    /// One AI turn's command batch.
    Ai,
}

/// Colour and width applied to a stroke when it is sealed.
///
/// The colour is passed through as given (`#RRGGBB` or `#RRGGBBAA`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: String,
    pub width: f64,
}

impl Brush {
    #[must_use]
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self { color: color.into(), width }
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_WIDTH)
    }
}

// =============================================================================
// SEALED
// =============================================================================

/// An immutable stroke owned by the history stack.
#[derive(Debug, Clone)]
pub struct Stroke {
    id: StrokeId,
    source: StrokeSource,
    brush: Brush,
    commands: Vec<DrawingCommand>,
    path: BezPath,
}

impl Stroke {
    /// Seal a complete batch in one step.
    #[must_use]
    pub fn from_commands(source: StrokeSource, brush: Brush, commands: Vec<DrawingCommand>) -> Self {
        let path = path::apply_commands(&commands, None);
        Self { id: Uuid::new_v4(), source, brush, commands, path }
    }

    #[must_use]
    pub fn id(&self) -> StrokeId {
        self.id
    }

    #[must_use]
    pub fn source(&self) -> StrokeSource {
        self.source
    }

    #[must_use]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.brush.color
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.brush.width
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawingCommand] {
        &self.commands
    }

    #[must_use]
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// The path as SVG path data (`d` attribute).
    #[must_use]
    pub fn svg_path(&self) -> String {
        self.path.to_svg()
    }
}

// =============================================================================
// LIVE
// =============================================================================

/// A stroke still being drawn. Owned by the engine until sealed.
#[derive(Debug, Clone)]
pub struct LiveStroke {
    source: StrokeSource,
    brush: Brush,
    commands: Vec<DrawingCommand>,
    path: BezPath,
}

impl LiveStroke {
    #[must_use]
    pub fn new(source: StrokeSource, brush: Brush) -> Self {
        Self { source, brush, commands: Vec::new(), path: BezPath::new() }
    }

    /// Append one command to both the command list and the path.
    pub fn push(&mut self, command: DrawingCommand) {
        path::append(&mut self.path, &command);
        self.commands.push(command);
    }

    #[must_use]
    pub fn source(&self) -> StrokeSource {
        self.source
    }

    #[must_use]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawingCommand] {
        &self.commands
    }

    #[must_use]
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Freeze into a [`Stroke`] with a fresh id.
    #[must_use]
    pub fn seal(self) -> Stroke {
        Stroke {
            id: Uuid::new_v4(),
            source: self.source,
            brush: self.brush,
            commands: self.commands,
            path: self.path,
        }
    }
}
