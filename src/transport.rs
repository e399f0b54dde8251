//! HTTP transport for drawing turns.
//!
//! The request body is opaque here: whatever JSON the caller built is posted
//! as-is to the configured endpoint with bearer auth. [`SketchClient::stream_turn`]
//! reads the event stream chunk by chunk into a [`StreamSession`];
//! [`SketchClient::fetch_turn`] reads a single complete response and parses
//! it as a command document.

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, info, warn};
use wire::{CommandSink, DrawingCommand, TurnSummary};

use crate::config::StreamConfig;
use crate::error::{TransportError, TurnError};
use crate::session::StreamSession;

pub struct SketchClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl SketchClient {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: &StreamConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, api_url: config.api_url.clone(), api_key: config.api_key.clone() })
    }

    /// Post `body` and feed the streamed reply into `sink`.
    ///
    /// Returns once the completion sentinel has been seen and `sink` has
    /// received `on_complete`. Dropping the future closes the connection;
    /// anything buffered at that point is discarded.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`]. Commands delivered before a failure stay
    /// delivered; the caller decides what to do with them.
    pub async fn stream_turn(
        &self,
        body: &Value,
        sink: &mut impl CommandSink,
    ) -> Result<TurnSummary, TransportError> {
        let response = self.post(body, "text/event-stream").await?;
        info!(url = %self.api_url, "stream: opened");

        let mut session = StreamSession::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| {
                warn!(error = %e, received = session.commands().len(), "stream: read failed");
                TransportError::Read(e.to_string())
            })?;
            session.feed_bytes(&chunk, sink);
            if session.is_complete() {
                break;
            }
        }
        session.finish(sink);

        if !session.is_complete() {
            let commands = session.commands().len();
            warn!(commands, "stream: closed before completion");
            return Err(TransportError::Incomplete { commands });
        }
        let summary = session.summary();
        debug!(?summary, "stream: summary");
        Ok(summary)
    }

    /// Post `body` and parse the whole reply as one command document.
    ///
    /// # Errors
    ///
    /// [`TurnError::Transport`] if the request fails, or
    /// [`TurnError::Schema`] if the reply holds no command document.
    pub async fn fetch_turn(&self, body: &Value) -> Result<Vec<DrawingCommand>, TurnError> {
        let response = self.post(body, "application/json").await?;
        let text = response.text().await.map_err(|e| TransportError::Read(e.to_string()))?;
        let commands = wire::parse_fallback_response(&text)?;
        info!(commands = commands.len(), "fetch: parsed");
        Ok(commands)
    }

    async fn post(&self, body: &Value, accept: &str) -> Result<reqwest::Response, TransportError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, accept)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "transport: non-success status");
            return Err(TransportError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }
}
