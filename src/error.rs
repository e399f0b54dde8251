//! Failure taxonomy at the engine boundary.
//!
//! Only two kinds of failure ever leave a turn: the transport broke, or the
//! non-streaming body did not hold a command document. Everything softer
//! (malformed fragments, unknown tags, out-of-range numbers) is absorbed
//! inside `wire` and only shows up in the turn summary.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use wire::SchemaError;

/// Configuration could not be assembled from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),

    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },
}

/// The connection failed or dropped before the turn completed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Connect(String),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned status {status}")]
    Status { status: u16, body: String },

    /// Reading the body failed part-way through.
    #[error("stream read failed: {0}")]
    Read(String),

    /// The body ended before the completion sentinel arrived.
    #[error("stream ended before completion ({commands} commands received)")]
    Incomplete { commands: usize },

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// A failed turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl TurnError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(TransportError::Connect(_)) => "E_TRANSPORT_CONNECT",
            Self::Transport(TransportError::Status { .. }) => "E_TRANSPORT_STATUS",
            Self::Transport(TransportError::Read(_)) => "E_TRANSPORT_READ",
            Self::Transport(TransportError::Incomplete { .. }) => "E_TRANSPORT_INCOMPLETE",
            Self::Transport(TransportError::ClientBuild(_)) => "E_HTTP_CLIENT_BUILD",
            Self::Schema(SchemaError::InvalidJson { .. }) => "E_SCHEMA_INVALID_JSON",
            Self::Schema(SchemaError::MissingContent { .. }) => "E_SCHEMA_MISSING_CONTENT",
            Self::Schema(SchemaError::MissingCommands { .. }) => "E_SCHEMA_MISSING_COMMANDS",
            Self::Schema(SchemaError::CommandsNotArray { .. }) => "E_SCHEMA_COMMANDS_NOT_ARRAY",
        }
    }

    /// Whether the same request might succeed if sent again.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(
                TransportError::Connect(_)
                    | TransportError::Read(_)
                    | TransportError::Incomplete { .. }
                    | TransportError::Status { status: 429 | 500..=599, .. }
            )
        )
    }

    /// Whether the caller may retry on the non-streaming path.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
