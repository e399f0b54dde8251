use serde_json::json;

use super::*;

// =============================================================
// Helpers
// =============================================================

#[derive(Default)]
struct Recorder {
    drawn: Vec<DrawingCommand>,
    completions: usize,
    /// Commands drawn before `on_complete` fired.
    drawn_at_complete: Option<usize>,
}

impl CommandSink for Recorder {
    fn on_incremental_draw(&mut self, command: &DrawingCommand) {
        self.drawn.push(*command);
    }

    fn on_complete(&mut self) {
        self.completions += 1;
        self.drawn_at_complete = Some(self.drawn.len());
    }
}

fn event(content: &str) -> String {
    let envelope = json!({"choices": [{"delta": {"content": content}}]});
    format!("data: {envelope}\n\n")
}

/// Wrap every piece of `doc` as its own SSE event.
fn events_for(pieces: &[&str]) -> Vec<String> {
    pieces.iter().map(|p| event(p)).collect()
}

const DOC: &str = r#"{"commands":[{"type":"moveTo","x":10,"y":20},{"type":"lineTo","x":1200,"y":-3},{"type":"cubicTo","x1":1,"y1":2,"x2":3,"y2":4,"x3":5,"y3":6},{"type":"addCircle","cx":9,"cy":9,"radius":0}]}"#;

fn expected() -> Vec<DrawingCommand> {
    vec![
        DrawingCommand::MoveTo { x: 10, y: 20 },
        DrawingCommand::LineTo { x: 1000, y: 0 },
        DrawingCommand::CubicTo { x1: 1, y1: 2, x2: 3, y2: 4, x3: 5, y3: 6 },
        DrawingCommand::AddCircle { cx: 9, cy: 9, radius: 1 },
    ]
}

// =============================================================
// Delivery
// =============================================================

#[test]
fn whole_document_in_one_event() {
    let mut stream = CommandStream::new();
    let mut sink = Recorder::default();
    stream.feed(&event(DOC), &mut sink);
    stream.feed("data: [DONE]\n\n", &mut sink);

    assert_eq!(sink.drawn, expected());
    assert_eq!(sink.completions, 1);
    assert!(stream.is_complete());
    assert_eq!(stream.commands(), expected().as_slice());
}

#[test]
fn split_invariance_across_events() {
    for size in [1, 2, 3, 5, 7, 11, 64] {
        let pieces: Vec<&str> = DOC
            .as_bytes()
            .chunks(size)
            .map(|c| std::str::from_utf8(c).expect("ascii"))
            .collect();
        let mut stream = CommandStream::new();
        let mut sink = Recorder::default();
        for raw in events_for(&pieces) {
            stream.feed(&raw, &mut sink);
        }
        assert_eq!(sink.drawn, expected(), "piece size {size}");
    }
}

#[test]
fn split_move_to_yields_single_command() {
    let mut stream = CommandStream::new();
    let mut sink = Recorder::default();
    for raw in events_for(&[r#"{"commands":["#, r#"{"type":"moveTo"#, r#"","x":10,"y":20}"#]) {
        stream.feed(&raw, &mut sink);
    }
    assert_eq!(sink.drawn, vec![DrawingCommand::MoveTo { x: 10, y: 20 }]);
}

#[test]
fn command_then_sentinel_in_one_unit() {
    let mut stream = CommandStream::new();
    let mut sink = Recorder::default();
    let raw = format!(
        "{}{}data: [DONE]\n\n",
        event(r#"{"commands":["#),
        event(r#"{"type":"lineTo","x":4,"y":5}]}"#)
    );
    stream.feed(&raw, &mut sink);

    assert_eq!(sink.drawn, vec![DrawingCommand::LineTo { x: 4, y: 5 }]);
    assert_eq!(sink.completions, 1);
    assert_eq!(sink.drawn_at_complete, Some(1));
}

#[test]
fn sentinel_only_emits_no_commands() {
    let mut stream = CommandStream::new();
    let mut sink = Recorder::default();
    stream.feed("data: [DONE]\n\n", &mut sink);
    assert!(sink.drawn.is_empty());
    assert_eq!(sink.completions, 1);
}

#[test]
fn completion_fires_once_and_later_input_is_ignored() {
    let mut stream = CommandStream::new();
    let mut sink = Recorder::default();
    stream.feed(&event(r#"{"commands":["#), &mut sink);
    stream.feed("data: [DONE]\n\n", &mut sink);
    stream.feed(&event(r#"{"type":"moveTo","x":1,"y":1}"#), &mut sink);
    stream.feed("data: [DONE]\n\n", &mut sink);
    stream.feed_text(r#"{"type":"moveTo","x":2,"y":2}"#, &mut sink);

    assert!(sink.drawn.is_empty());
    assert_eq!(sink.completions, 1);
}

// =============================================================
// Soft failures
// =============================================================

#[test]
fn soft_failures_are_counted_not_fatal() {
    let mut stream = CommandStream::new();
    let mut sink = Recorder::default();
    stream.feed_text(
        concat!(
            r#"{"commands":["#,
            r#"{"type":"moveTo","x":1,"y":1},"#,
            r#"{"type":"moveTo","x":1,"y":1},"#,
            r#"{"type":"lineTo",,},"#,
            r#"{"type":"sparkle"},"#,
            r#"{"type":"quadTo","x1":1},"#,
            r#"{"type":"lineTo","x":2,"y":2}]}"#,
        ),
        &mut sink,
    );

    assert_eq!(sink.drawn, vec![DrawingCommand::MoveTo { x: 1, y: 1 }, DrawingCommand::LineTo { x: 2, y: 2 }]);
    assert_eq!(
        stream.summary(),
        TurnSummary { commands: 2, duplicates: 1, malformed: 1, unrecognized: 1, invalid: 1 }
    );
}

#[test]
fn streams_do_not_share_state() {
    let mut first = CommandStream::new();
    let mut second = CommandStream::new();
    let mut sink_a = Recorder::default();
    let mut sink_b = Recorder::default();

    first.feed_text(r#"{"commands":[{"type":"moveTo","x":1,"y":1}"#, &mut sink_a);
    second.feed_text(r#"{"type":"moveTo","x":1,"y":1}"#, &mut sink_b);
    assert!(sink_b.drawn.is_empty());

    second.feed_text(r#"{"commands":[{"type":"moveTo","x":1,"y":1}"#, &mut sink_b);
    assert_eq!(sink_a.drawn, sink_b.drawn);
    assert_eq!(first.into_commands().len(), 1);
}
