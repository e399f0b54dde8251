//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Flattening tolerance used when a circle is expanded into Bézier segments.
pub const CIRCLE_TOLERANCE: f64 = 0.1;

// ── Brush ───────────────────────────────────────────────────────

/// Default colour for user strokes.
pub const DEFAULT_BRUSH_COLOR: &str = "#1F1A17";

/// Default width for user strokes, in canvas units.
pub const DEFAULT_BRUSH_WIDTH: f64 = 3.0;

/// Default colour for AI reply strokes.
pub const DEFAULT_AI_COLOR: &str = "#4A90E2";

/// Default width for AI reply strokes, in canvas units.
pub const DEFAULT_AI_WIDTH: f64 = 3.0;
