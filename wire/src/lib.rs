//! Wire layer for streamed drawing replies.
//!
//! This crate owns everything between the raw event-stream text delivered by
//! the transport and the validated [`command::DrawingCommand`]s consumed by
//! the canvas. It is pure and synchronous: callers hand it text in arrival
//! order and it hands back commands in array order, tolerating fragment
//! boundaries anywhere, including inside a single token.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`sse`] | Envelope decoder: `data:` lines, delta text, terminal sentinel |
//! | [`extract`] | Fragment-tolerant object extractor over the `commands` array |
//! | [`command`] | Closed command set, clamping validator, batch validator |
//! | [`fallback`] | Non-streaming response parsing (code-fence stripping) |
//! | [`stream`] | Per-stream [`stream::CommandStream`] chaining the three stages |

pub mod command;
pub mod extract;
pub mod fallback;
pub mod sse;
pub mod stream;

pub use command::{CommandKind, DrawingCommand, Rejection, SchemaError, validate, validate_batch};
pub use extract::ObjectExtractor;
pub use fallback::{parse_command_document, parse_fallback_response};
pub use sse::{EnvelopeDecoder, EnvelopeEvent};
pub use stream::{CommandSink, CommandStream, TurnSummary};
