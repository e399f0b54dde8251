//! Byte-level session: transport chunks in, complete event lines out.
//!
//! Transport chunks split wherever the network pleases, including inside a
//! multi-byte UTF-8 sequence or in the middle of an envelope line. A
//! [`StreamSession`] holds back everything after the last newline, so the
//! envelope decoder only ever sees whole lines of valid text.
//!
//! [`LiveTurn`] is the sink that connects a stream to a
//! [`canvas::EngineCore`]: each command extends the live AI stroke, and the
//! completion signal seals it.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use canvas::{Action, EngineCore};
use tracing::{debug, warn};
use wire::{CommandSink, CommandStream, DrawingCommand, TurnSummary};

#[derive(Debug, Default)]
pub struct StreamSession {
    stream: CommandStream,
    pending: Vec<u8>,
}

impl StreamSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one transport chunk and forward every complete line in it.
    pub fn feed_bytes(&mut self, chunk: &[u8], sink: &mut impl CommandSink) {
        if self.stream.is_complete() {
            return;
        }
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return;
        };
        let rest = self.pending.split_off(last_newline + 1);
        let lines = std::mem::replace(&mut self.pending, rest);
        self.forward(&lines, sink);
    }

    /// Flush a final unterminated line once the transport has closed.
    pub fn finish(&mut self, sink: &mut impl CommandSink) {
        if self.pending.is_empty() || self.stream.is_complete() {
            return;
        }
        let tail = std::mem::take(&mut self.pending);
        debug!(bytes = tail.len(), "session: flushing unterminated line");
        self.forward(&tail, sink);
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stream.is_complete()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawingCommand] {
        self.stream.commands()
    }

    #[must_use]
    pub fn summary(&self) -> TurnSummary {
        self.stream.summary()
    }

    /// Bytes held back waiting for a newline.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    fn forward(&mut self, bytes: &[u8], sink: &mut impl CommandSink) {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.stream.feed(text, sink),
            Err(e) => {
                warn!(error = %e, "session: invalid utf-8 in event stream, replacing");
                self.stream.feed(&String::from_utf8_lossy(bytes), sink);
            }
        }
    }
}

// =============================================================================
// ENGINE SINK
// =============================================================================

/// Routes stream callbacks into an engine's live AI stroke.
///
/// The caller opens the turn with [`EngineCore::begin_ai_turn`] first.
/// `observer` sees each command after the engine has applied it.
pub struct LiveTurn<'a, F: FnMut(&DrawingCommand)> {
    engine: &'a mut EngineCore,
    observer: F,
    outcome: Option<Action>,
}

impl<'a, F: FnMut(&DrawingCommand)> LiveTurn<'a, F> {
    pub fn new(engine: &'a mut EngineCore, observer: F) -> Self {
        Self { engine, observer, outcome: None }
    }

    /// What sealing the turn produced, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<&Action> {
        self.outcome.as_ref()
    }
}

impl<F: FnMut(&DrawingCommand)> CommandSink for LiveTurn<'_, F> {
    fn on_incremental_draw(&mut self, command: &DrawingCommand) {
        match self.engine.apply_live(*command) {
            Ok(_) => (self.observer)(command),
            Err(e) => warn!(error = %e, "session: command dropped, no live turn"),
        }
    }

    fn on_complete(&mut self) {
        match self.engine.finish_ai_turn() {
            Ok(action) => self.outcome = Some(action),
            Err(e) => warn!(error = %e, "session: completion without live turn"),
        }
    }
}
