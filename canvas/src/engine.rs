use tracing::{debug, info};
use wire::DrawingCommand;

use crate::consts::{DEFAULT_AI_COLOR, DEFAULT_AI_WIDTH};
use crate::history::{HistoryStack, HistoryStatus};
use crate::stroke::{Brush, LiveStroke, Stroke, StrokeId, StrokeSource};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Visible geometry changed; redraw.
    RenderNeeded,
    /// A live stroke was sealed onto the history stack.
    StrokeSealed { id: StrokeId },
    /// A live stroke was dropped without reaching history.
    StrokeDiscarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("a {0:?} stroke is already in progress")]
    StrokeInProgress(StrokeSource),
    #[error("no {0:?} stroke is in progress")]
    NoStrokeInProgress(StrokeSource),
}

/// Engine state: the history stack plus at most one live stroke.
///
/// Only one writer at a time. While a stroke is live (an AI turn streaming
/// in, or a gesture in progress) every other mutation is refused with
/// [`EngineError::StrokeInProgress`].
#[derive(Debug)]
pub struct EngineCore {
    history: HistoryStack,
    live: Option<LiveStroke>,
    brush: Brush,
    ai_brush: Brush,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            history: HistoryStack::new(),
            live: None,
            brush: Brush::default(),
            ai_brush: Brush::new(DEFAULT_AI_COLOR, DEFAULT_AI_WIDTH),
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose AI turns are sealed with `ai_brush`.
    #[must_use]
    pub fn with_ai_brush(ai_brush: Brush) -> Self {
        Self { ai_brush, ..Self::default() }
    }

    // --- AI turns ---

    /// Open a live stroke for an incoming AI turn.
    ///
    /// # Errors
    ///
    /// Fails if any stroke is already live.
    pub fn begin_ai_turn(&mut self) -> Result<(), EngineError> {
        self.ensure_idle()?;
        debug!("engine: ai turn opened");
        self.live = Some(LiveStroke::new(StrokeSource::Ai, self.ai_brush.clone()));
        Ok(())
    }

    /// Append one streamed command to the live AI stroke.
    ///
    /// # Errors
    ///
    /// Fails if no AI turn is open.
    pub fn apply_live(&mut self, command: DrawingCommand) -> Result<Action, EngineError> {
        let live = self.live_of(StrokeSource::Ai)?;
        live.push(command);
        Ok(Action::RenderNeeded)
    }

    /// Seal the live AI stroke onto history. A turn that drew nothing is
    /// discarded rather than pushed.
    ///
    /// # Errors
    ///
    /// Fails if no AI turn is open.
    pub fn finish_ai_turn(&mut self) -> Result<Action, EngineError> {
        self.live_of(StrokeSource::Ai)?;
        let Some(live) = self.live.take() else {
            return Err(EngineError::NoStrokeInProgress(StrokeSource::Ai));
        };
        if live.is_empty() {
            debug!("engine: empty ai turn discarded");
            return Ok(Action::StrokeDiscarded);
        }
        Ok(self.seal(live))
    }

    /// Drop whatever stroke is live. Used when a transport fails mid-turn.
    pub fn abort_live(&mut self) -> Action {
        match self.live.take() {
            Some(live) => {
                info!(
                    source = ?live.source(),
                    commands = live.commands().len(),
                    "engine: live stroke aborted"
                );
                Action::StrokeDiscarded
            }
            None => Action::None,
        }
    }

    /// Seal a complete batch (the non-streaming path) as one AI stroke.
    ///
    /// # Errors
    ///
    /// Fails if a stroke is live.
    pub fn push_batch(&mut self, commands: Vec<DrawingCommand>) -> Result<Action, EngineError> {
        self.ensure_idle()?;
        if commands.is_empty() {
            return Ok(Action::None);
        }
        let stroke = Stroke::from_commands(StrokeSource::Ai, self.ai_brush.clone(), commands);
        let id = self.history.push(stroke);
        Ok(Action::StrokeSealed { id })
    }

    // --- Freehand ---

    /// Brush used for subsequent user strokes.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    /// Brush used for subsequent AI turns.
    pub fn set_ai_brush(&mut self, brush: Brush) {
        self.ai_brush = brush;
    }

    /// Start a gesture at `(x, y)`. Coordinates are clamped to the canvas.
    ///
    /// # Errors
    ///
    /// Fails if any stroke is already live.
    pub fn begin_stroke(&mut self, x: i32, y: i32) -> Result<Action, EngineError> {
        self.ensure_idle()?;
        let mut live = LiveStroke::new(StrokeSource::User, self.brush.clone());
        live.push(DrawingCommand::move_to(x, y));
        self.live = Some(live);
        Ok(Action::RenderNeeded)
    }

    /// Extend the gesture to `(x, y)`.
    ///
    /// # Errors
    ///
    /// Fails if no gesture is live.
    pub fn extend_stroke(&mut self, x: i32, y: i32) -> Result<Action, EngineError> {
        let live = self.live_of(StrokeSource::User)?;
        live.push(DrawingCommand::line_to(x, y));
        Ok(Action::RenderNeeded)
    }

    /// Finish the gesture. A tap with no movement is discarded.
    ///
    /// # Errors
    ///
    /// Fails if no gesture is live.
    pub fn end_stroke(&mut self) -> Result<Action, EngineError> {
        self.live_of(StrokeSource::User)?;
        let Some(live) = self.live.take() else {
            return Err(EngineError::NoStrokeInProgress(StrokeSource::User));
        };
        if live.commands().len() < 2 {
            return Ok(Action::StrokeDiscarded);
        }
        Ok(self.seal(live))
    }

    // --- History ---

    /// # Errors
    ///
    /// Fails while a stroke is live.
    pub fn undo(&mut self) -> Result<Action, EngineError> {
        self.ensure_idle()?;
        Ok(if self.history.undo() { Action::RenderNeeded } else { Action::None })
    }

    /// # Errors
    ///
    /// Fails while a stroke is live.
    pub fn redo(&mut self) -> Result<Action, EngineError> {
        self.ensure_idle()?;
        Ok(if self.history.redo() { Action::RenderNeeded } else { Action::None })
    }

    /// Drop all history. Not undoable.
    ///
    /// # Errors
    ///
    /// Fails while a stroke is live.
    pub fn clear(&mut self) -> Result<Action, EngineError> {
        self.ensure_idle()?;
        if self.history.all().is_empty() {
            return Ok(Action::None);
        }
        self.history.clear();
        Ok(Action::RenderNeeded)
    }

    /// Forward to [`HistoryStack::subscribe`].
    pub fn subscribe(&mut self, listener: impl FnMut(&HistoryStatus) + 'static) {
        self.history.subscribe(listener);
    }

    // --- Queries ---

    #[must_use]
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    #[must_use]
    pub fn visible(&self) -> &[Stroke] {
        self.history.visible()
    }

    #[must_use]
    pub fn live(&self) -> Option<&LiveStroke> {
        self.live.as_ref()
    }

    #[must_use]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    #[must_use]
    pub fn ai_brush(&self) -> &Brush {
        &self.ai_brush
    }

    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        self.history.status()
    }

    // --- Internals ---

    fn ensure_idle(&self) -> Result<(), EngineError> {
        match &self.live {
            Some(live) => Err(EngineError::StrokeInProgress(live.source())),
            None => Ok(()),
        }
    }

    fn live_of(&mut self, source: StrokeSource) -> Result<&mut LiveStroke, EngineError> {
        match self.live.as_mut() {
            Some(live) if live.source() == source => Ok(live),
            _ => Err(EngineError::NoStrokeInProgress(source)),
        }
    }

    fn seal(&mut self, live: LiveStroke) -> Action {
        let stroke = live.seal();
        info!(
            source = ?stroke.source(),
            commands = stroke.commands().len(),
            color = %stroke.color(),
            "engine: stroke sealed"
        );
        let id = self.history.push(stroke);
        Action::StrokeSealed { id }
    }
}
