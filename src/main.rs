use std::path::{Path, PathBuf};

use canvas::{EngineCore, EngineError, HistoryStatus};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use sketchstream::{
    ConfigError, LiveTurn, SketchClient, StreamConfig, StreamSession, TransportError, TurnError,
};
use tracing::{info, warn};
use wire::{DrawingCommand, TurnSummary};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("--chunk-size must be at least 1")]
    ChunkSize,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("turn failed [{code}]: {0}", code = .0.error_code())]
    Turn(#[from] TurnError),
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        Self::Turn(TurnError::Transport(e))
    }
}

#[derive(Parser, Debug)]
#[command(name = "sketchstream", about = "Stream AI drawing commands onto a canvas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a captured event-stream transcript from disk.
    Replay {
        file: PathBuf,
        /// Bytes per simulated transport chunk.
        #[arg(long, default_value_t = 16)]
        chunk_size: usize,
    },
    /// Run a live streaming turn against the configured endpoint.
    Stream {
        /// JSON request body, posted as-is.
        #[arg(long)]
        body: PathBuf,
        /// Retry on the non-streaming path if the stream fails.
        #[arg(long)]
        fallback: bool,
    },
    /// Run a non-streaming turn.
    Fetch {
        #[arg(long)]
        body: PathBuf,
    },
}

/// Final line printed after the command lines.
#[derive(Debug, Serialize)]
struct Report {
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<TurnSummary>,
    history: HistoryStatus,
    svg: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay { file, chunk_size } => run_replay(&file, chunk_size),
        Command::Stream { body, fallback } => run_stream(&body, fallback).await,
        Command::Fetch { body } => run_fetch(&body).await,
    }
}

fn run_replay(file: &Path, chunk_size: usize) -> Result<(), CliError> {
    if chunk_size == 0 {
        return Err(CliError::ChunkSize);
    }
    let bytes =
        std::fs::read(file).map_err(|source| CliError::Io { path: file.to_path_buf(), source })?;

    let mut engine = EngineCore::new();
    engine.begin_ai_turn()?;
    let mut session = StreamSession::new();
    {
        let mut turn = LiveTurn::new(&mut engine, print_command);
        for chunk in bytes.chunks(chunk_size) {
            session.feed_bytes(chunk, &mut turn);
        }
        session.finish(&mut turn);
    }
    if !session.is_complete() {
        engine.abort_live();
        return Err(TransportError::Incomplete { commands: session.commands().len() }.into());
    }
    print_report("replay", Some(session.summary()), &engine)
}

async fn run_stream(body_path: &Path, fallback: bool) -> Result<(), CliError> {
    let body = read_body(body_path)?;
    let config = StreamConfig::from_env()?;
    let client = SketchClient::new(&config)?;
    let mut engine = EngineCore::with_ai_brush(config.ai_brush);

    engine.begin_ai_turn()?;
    let streamed = {
        let mut turn = LiveTurn::new(&mut engine, print_command);
        client.stream_turn(&body, &mut turn).await
    };

    match streamed {
        Ok(summary) => print_report("stream", Some(summary), &engine),
        Err(e) => {
            engine.abort_live();
            if !fallback {
                return Err(e.into());
            }
            warn!(error = %e, "stream failed, retrying without streaming");
            let commands = client.fetch_turn(&non_streaming(body)).await?;
            commands.iter().for_each(print_command);
            engine.push_batch(commands)?;
            print_report("fallback", None, &engine)
        }
    }
}

async fn run_fetch(body_path: &Path) -> Result<(), CliError> {
    let body = read_body(body_path)?;
    let config = StreamConfig::from_env()?;
    let client = SketchClient::new(&config)?;
    let mut engine = EngineCore::with_ai_brush(config.ai_brush);

    let commands = client.fetch_turn(&body).await?;
    commands.iter().for_each(print_command);
    engine.push_batch(commands)?;
    print_report("fetch", None, &engine)
}

fn read_body(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&text)?)
}

/// The same request with streaming switched off, for the fallback path.
fn non_streaming(mut body: Value) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.insert("stream".into(), Value::Bool(false));
    }
    body
}

fn print_command(command: &DrawingCommand) {
    match serde_json::to_string(command) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "command not printable"),
    }
}

fn print_report(
    mode: &'static str,
    summary: Option<TurnSummary>,
    engine: &EngineCore,
) -> Result<(), CliError> {
    let report = Report {
        mode,
        summary,
        history: engine.status(),
        svg: engine.visible().iter().map(canvas::Stroke::svg_path).collect(),
    };
    info!(mode, strokes = report.svg.len(), "turn finished");
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
