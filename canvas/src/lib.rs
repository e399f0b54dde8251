//! Path accumulation, strokes, and undo/redo history for streamed drawings.
//!
//! Validated [`wire::DrawingCommand`]s flow into this crate one at a time
//! while an AI turn streams, or as one batch from the non-streaming path.
//! [`engine::EngineCore`] owns the single live stroke and the history stack
//! and refuses overlapping writers. The host renders whatever
//! [`engine::EngineCore::visible`] and [`engine::EngineCore::live`] return.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Single-writer engine and the [`engine::Action`]s it returns |
//! | [`history`] | Stroke stack with an active cursor and change notification |
//! | [`stroke`] | Sealed and live strokes, brushes |
//! | [`path`] | Command → `kurbo::BezPath` accumulation |
//! | [`consts`] | Default brushes and curve tolerance |

pub mod consts;
pub mod engine;
pub mod history;
pub mod path;
pub mod stroke;

pub use engine::{Action, EngineCore, EngineError};
pub use history::{HistoryStack, HistoryStatus};
pub use stroke::{Brush, LiveStroke, Stroke, StrokeId, StrokeSource};
