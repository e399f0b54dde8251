//! Path accumulation: validated commands → `kurbo::BezPath`.
//!
//! Commands are appended strictly in order and never rewrite earlier
//! elements, so applying a list in two halves produces the same path as
//! applying it in one call. That append law is what lets a streamed reply
//! render incrementally and still match a single batch render.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use kurbo::{BezPath, Circle, PathEl, Point, Shape};
use wire::DrawingCommand;

use crate::consts::CIRCLE_TOLERANCE;

/// Apply `commands` to `existing`, or to a fresh path when `None`.
#[must_use]
pub fn apply_commands(commands: &[DrawingCommand], existing: Option<BezPath>) -> BezPath {
    let mut path = existing.unwrap_or_default();
    extend_path(&mut path, commands);
    path
}

/// Append `commands` to `path` in place.
pub fn extend_path(path: &mut BezPath, commands: &[DrawingCommand]) {
    for command in commands {
        append(path, command);
    }
}

/// Append a single command to `path`.
pub fn append(path: &mut BezPath, command: &DrawingCommand) {
    match *command {
        DrawingCommand::MoveTo { x, y } => path.move_to(point(x, y)),
        DrawingCommand::LineTo { x, y } => {
            ensure_subpath(path);
            path.line_to(point(x, y));
        }
        DrawingCommand::QuadTo { x1, y1, x2, y2 } => {
            ensure_subpath(path);
            path.quad_to(point(x1, y1), point(x2, y2));
        }
        DrawingCommand::CubicTo { x1, y1, x2, y2, x3, y3 } => {
            ensure_subpath(path);
            path.curve_to(point(x1, y1), point(x2, y2), point(x3, y3));
        }
        DrawingCommand::AddCircle { cx, cy, radius } => {
            let circle = Circle::new(point(cx, cy), f64::from(radius));
            for el in circle.path_elements(CIRCLE_TOLERANCE) {
                path.push(el);
            }
        }
    }
}

/// End points of every segment, in order. Useful for comparing geometry.
#[must_use]
pub fn end_points(path: &BezPath) -> Vec<Point> {
    path.elements()
        .iter()
        .filter_map(|el| match *el {
            PathEl::MoveTo(p)
            | PathEl::LineTo(p)
            | PathEl::QuadTo(_, p)
            | PathEl::CurveTo(_, _, p) => Some(p),
            PathEl::ClosePath => None,
        })
        .collect()
}

// Segments need an open subpath. An empty path starts from the origin; after
// a close (every circle ends in one) the pen sits at the closed subpath's start.
fn ensure_subpath(path: &mut BezPath) {
    let reopen_at = match path.elements().last() {
        None => Some(Point::ORIGIN),
        Some(PathEl::ClosePath) => Some(subpath_start(path)),
        Some(_) => None,
    };
    if let Some(start) = reopen_at {
        path.move_to(start);
    }
}

fn subpath_start(path: &BezPath) -> Point {
    path.elements()
        .iter()
        .rev()
        .find_map(|el| match *el {
            PathEl::MoveTo(p) => Some(p),
            _ => None,
        })
        .unwrap_or(Point::ORIGIN)
}

fn point(x: i32, y: i32) -> Point {
    Point::new(f64::from(x), f64::from(y))
}
