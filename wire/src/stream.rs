//! Per-stream pipeline: envelope decoder → object extractor → validator.
//!
//! A [`CommandStream`] is created when a request starts streaming and dropped
//! when it completes or fails. It owns all parser state for that one stream,
//! so concurrent or back-to-back streams never interfere.

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;

use serde::Serialize;
use tracing::{debug, info};

use crate::command::{DrawingCommand, validate};
use crate::extract::ObjectExtractor;
use crate::sse::{EnvelopeDecoder, EnvelopeEvent};

/// Consumer of a command stream.
pub trait CommandSink {
    /// Called once per validated command, in array order.
    fn on_incremental_draw(&mut self, command: &DrawingCommand);

    /// Called exactly once, when the terminal sentinel is seen.
    fn on_complete(&mut self);
}

/// Counters describing what a stream produced and what it absorbed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    /// Commands delivered to the sink.
    pub commands: usize,
    /// Exact repeats of an already emitted object.
    pub duplicates: usize,
    /// Object spans that failed to parse.
    pub malformed: usize,
    /// Objects without a known `type` tag.
    pub unrecognized: usize,
    /// Known objects missing a numeric field.
    pub invalid: usize,
}

/// Parser state for one in-flight stream.
#[derive(Debug, Default)]
pub struct CommandStream {
    decoder: EnvelopeDecoder,
    extractor: ObjectExtractor,
    commands: Vec<DrawingCommand>,
    invalid: usize,
    complete: bool,
}

impl CommandStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a unit of raw event-stream text.
    ///
    /// Commands are delivered to `sink` as their objects close; completion is
    /// signalled after any command that precedes the sentinel in the unit.
    /// Input arriving after completion is ignored.
    pub fn feed(&mut self, raw: &str, sink: &mut impl CommandSink) {
        if self.complete {
            return;
        }
        for event in self.decoder.feed(raw) {
            match event {
                EnvelopeEvent::Delta(text) => self.feed_text(&text, sink),
                EnvelopeEvent::Done => {
                    self.complete = true;
                    info!(commands = self.commands.len(), "stream: complete");
                    sink.on_complete();
                }
            }
        }
    }

    /// Feed delta text straight to the extractor, bypassing the envelope.
    pub fn feed_text(&mut self, text: &str, sink: &mut impl CommandSink) {
        if self.complete {
            return;
        }
        let commands = &mut self.commands;
        let invalid = &mut self.invalid;
        self.extractor.feed(text, |raw| match validate(&raw) {
            Ok(command) => {
                commands.push(command);
                sink.on_incremental_draw(&command);
            }
            Err(reason) => {
                debug!(%reason, "stream: dropped object");
                *invalid += 1;
            }
        });
    }

    /// Whether the terminal sentinel has been seen.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Every command delivered so far, in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawingCommand] {
        &self.commands
    }

    /// Consume the stream, keeping the delivered batch.
    #[must_use]
    pub fn into_commands(self) -> Vec<DrawingCommand> {
        self.commands
    }

    #[must_use]
    pub fn summary(&self) -> TurnSummary {
        let stats = self.extractor.stats();
        TurnSummary {
            commands: self.commands.len(),
            duplicates: stats.duplicates,
            malformed: stats.malformed,
            unrecognized: stats.unrecognized,
            invalid: self.invalid,
        }
    }
}
