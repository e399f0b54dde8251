//! Streaming AI drawing engine: transport, session framing, and configuration.
//!
//! The pure parsing pipeline lives in [`wire`]; strokes and history live in
//! [`canvas`]. This crate supplies the I/O around them.
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | [`StreamConfig`] from `SKETCH_*` environment variables |
//! | [`error`] | [`TurnError`] and its transport/config companions |
//! | [`session`] | Byte → line framing and the engine-backed [`LiveTurn`] sink |
//! | [`transport`] | [`SketchClient`]: streaming and non-streaming requests |

pub mod config;
pub mod error;
pub mod session;
pub mod transport;

pub use config::StreamConfig;
pub use error::{ConfigError, TransportError, TurnError};
pub use session::{LiveTurn, StreamSession};
pub use transport::SketchClient;
