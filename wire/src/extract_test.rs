use serde_json::{Value, json};

use super::*;

// =============================================================
// Helpers
// =============================================================

fn collect(extractor: &mut ObjectExtractor, fragments: &[&str]) -> Vec<Value> {
    let mut out = Vec::new();
    for fragment in fragments {
        extractor.feed(fragment, |v| out.push(v));
    }
    out
}

fn extract_whole(doc: &str) -> Vec<Value> {
    collect(&mut ObjectExtractor::new(), &[doc])
}

/// Split `doc` into consecutive pieces of `size` bytes (on char boundaries).
fn chunks(doc: &str, size: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < doc.len() {
        let mut end = (start + size).min(doc.len());
        while !doc.is_char_boundary(end) {
            end += 1;
        }
        out.push(&doc[start..end]);
        start = end;
    }
    out
}

const DOC: &str = r#"{"commands":[{"type":"moveTo","x":10,"y":20},{"type":"lineTo","x":30,"y":40},{"type":"quadTo","x1":1,"y1":2,"x2":3,"y2":4},{"type":"addCircle","cx":500,"cy":500,"radius":25}]}"#;

// =============================================================
// Array marker
// =============================================================

#[test]
fn nothing_emitted_before_array_marker() {
    let mut ex = ObjectExtractor::new();
    let out = collect(&mut ex, &[r#"{"type":"moveTo","x":1,"y":1}"#]);
    assert!(out.is_empty());
    assert!(!ex.in_array());
}

#[test]
fn metadata_before_array_is_ignored() {
    let doc = r#"{"analysis":{"type":"moveTo","x":1,"y":1},"commands":[{"type":"lineTo","x":2,"y":2}]}"#;
    let out = extract_whole(doc);
    assert_eq!(out, vec![json!({"type": "lineTo", "x": 2, "y": 2})]);
}

#[test]
fn marker_split_across_fragments() {
    let mut ex = ObjectExtractor::new();
    let out = collect(&mut ex, &[r#"{"comm"#, r#"ands""#, " : ", "\n[", r#"{"type":"moveTo","x":3,"y":4}"#]);
    assert!(ex.in_array());
    assert_eq!(out, vec![json!({"type": "moveTo", "x": 3, "y": 4})]);
}

#[test]
fn key_text_not_followed_by_array_is_skipped() {
    let doc = r#"{"note":"commands","commands":[{"type":"moveTo","x":5,"y":6}]}"#;
    assert_eq!(extract_whole(doc).len(), 1);
}

#[test]
fn find_array_start_waits_for_bracket() {
    assert_eq!(find_array_start(r#"{"commands""#), None);
    assert_eq!(find_array_start(r#"{"commands": "#), None);
    assert_eq!(find_array_start(r#"{"commands": ["#), Some(14));
}

// =============================================================
// Split invariance
// =============================================================

#[test]
fn object_split_mid_string() {
    let mut ex = ObjectExtractor::new();
    let out = collect(&mut ex, &[r#"{"commands":["#, r#"{"type":"moveTo"#, r#"","x":10,"y":20}"#]);
    assert_eq!(out, vec![json!({"type": "moveTo", "x": 10, "y": 20})]);
}

#[test]
fn object_split_into_tiny_fragments() {
    let mut ex = ObjectExtractor::new();
    let fragments = [
        r#"{"commands":["#, "{", "\"ty", "pe\"", ":", "\"mo", "veT", "o\"", ",\"x", "\":1", "0,\"y\"", ":20", "}",
    ];
    let out = collect(&mut ex, &fragments);
    assert_eq!(out, vec![json!({"type": "moveTo", "x": 10, "y": 20})]);
}

#[test]
fn every_chunk_size_yields_same_sequence() {
    let whole = extract_whole(DOC);
    assert_eq!(whole.len(), 4);
    for size in 1..=DOC.len() {
        let mut ex = ObjectExtractor::new();
        let out = collect(&mut ex, &chunks(DOC, size));
        assert_eq!(out, whole, "chunk size {size}");
    }
}

#[test]
fn every_two_way_split_yields_same_sequence() {
    let whole = extract_whole(DOC);
    for cut in 0..=DOC.len() {
        let mut ex = ObjectExtractor::new();
        let out = collect(&mut ex, &[&DOC[..cut], &DOC[cut..]]);
        assert_eq!(out, whole, "cut at {cut}");
    }
}

#[test]
fn incomplete_object_stays_pending() {
    let mut ex = ObjectExtractor::new();
    let n = ex.feed(r#"{"commands":[{"type":"lineTo","x":1"#, |_| {});
    assert_eq!(n, 0);
    assert!(ex.pending().starts_with('{'));
}

// =============================================================
// String and escape handling
// =============================================================

#[test]
fn braces_inside_strings_do_not_affect_depth() {
    let doc = r#"{"commands":[{"type":"moveTo","x":1,"y":2,"content":"Hello {world} with }braces{"}]}"#;
    let out = extract_whole(doc);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["content"], "Hello {world} with }braces{");
}

#[test]
fn escaped_quotes_keep_string_context() {
    let doc = r#"{"commands":[{"type":"lineTo","x":1,"y":2,"message":"Say \"hello\" to {brackets}"}]}"#;
    let out = extract_whole(doc);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["message"], "Say \"hello\" to {brackets}");
}

#[test]
fn escaped_backslash_before_quote_closes_string() {
    let doc = r#"{"commands":[{"type":"lineTo","x":1,"y":2,"path":"C:\\dir\\"},{"type":"moveTo","x":3,"y":4}]}"#;
    let out = extract_whole(doc);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["path"], "C:\\dir\\");
}

#[test]
fn escape_split_across_fragments() {
    let mut ex = ObjectExtractor::new();
    let out = collect(
        &mut ex,
        &[r#"{"commands":[{"type":"moveTo","x":1,"y":2,"s":"a\"#, r#""}"#, r#"b"}"#],
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["s"], "a\"}b");
}

#[test]
fn nested_objects_are_kept_whole() {
    let doc = r#"{"commands":[{"type":"moveTo","x":1,"y":2,"meta":{"a":{"b":1}}}]}"#;
    let out = extract_whole(doc);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["meta"]["a"]["b"], 1);
}

#[test]
fn balanced_span_len_counts_closing_brace() {
    assert_eq!(balanced_span_len(b"{}"), Some(2));
    assert_eq!(balanced_span_len(b"{\"a\":\"}\"}tail"), Some(9));
    assert_eq!(balanced_span_len(b"{\"a\":{}"), None);
}

// =============================================================
// Multiple objects, recovery, filtering
// =============================================================

#[test]
fn two_objects_in_one_fragment_emit_in_order() {
    let mut ex = ObjectExtractor::new();
    let mut out = Vec::new();
    let n = ex.feed(
        r#"{"commands":[{"type":"moveTo","x":1,"y":1},{"type":"lineTo","x":2,"y":2}"#,
        |v| out.push(v),
    );
    assert_eq!(n, 2);
    assert_eq!(out[0]["type"], "moveTo");
    assert_eq!(out[1]["type"], "lineTo");
}

#[test]
fn malformed_then_valid_emits_only_valid() {
    let mut ex = ObjectExtractor::new();
    let out = collect(
        &mut ex,
        &[r#"{"commands":[{"type":"moveTo","x":1,,"y":1},{"type":"lineTo","x":2,"y":2}]}"#],
    );
    assert_eq!(out, vec![json!({"type": "lineTo", "x": 2, "y": 2})]);
    assert_eq!(ex.stats().malformed, 1);
}

#[test]
fn unknown_and_untagged_objects_are_skipped() {
    let mut ex = ObjectExtractor::new();
    let out = collect(
        &mut ex,
        &[r#"{"commands":[{"type":"arcTo","x":1},{"x":1,"y":2},{"type":"moveTo","x":1,"y":1}]}"#],
    );
    assert_eq!(out.len(), 1);
    assert_eq!(ex.stats().unrecognized, 2);
}

#[test]
fn exact_repeats_are_emitted_once() {
    let mut ex = ObjectExtractor::new();
    let obj = r#"{"type":"lineTo","x":5,"y":5}"#;
    let out = collect(&mut ex, &[r#"{"commands":["#, obj, ",", obj, ",", obj]);
    assert_eq!(out.len(), 1);
    assert_eq!(ex.emitted(), 1);
    assert_eq!(ex.stats().duplicates, 2);
}

#[test]
fn differently_spelled_equal_objects_are_distinct() {
    let mut ex = ObjectExtractor::new();
    let out = collect(
        &mut ex,
        &[r#"{"commands":[{"type":"lineTo","x":5,"y":5},{"type":"lineTo", "x":5,"y":5}]}"#],
    );
    assert_eq!(out.len(), 2);
}

// =============================================================
// Memory bound
// =============================================================

#[test]
fn consumed_prefix_is_pruned() {
    let mut ex = ObjectExtractor::new();
    ex.feed(r#"{"commands":["#, |_| {});
    for i in 0..200 {
        ex.feed(&format!(r#"{{"type":"lineTo","x":{i},"y":{i}}},"#), |_| {});
    }
    assert_eq!(ex.emitted(), 200);
    assert!(ex.buffered() <= PRUNE_THRESHOLD + 64, "buffer grew to {}", ex.buffered());
}

#[test]
fn pruning_never_drops_an_open_object() {
    let mut ex = ObjectExtractor::new();
    let mut out = Vec::new();
    ex.feed(r#"{"commands":["#, |v| out.push(v));
    for i in 0..100 {
        ex.feed(&format!(r#"{{"type":"moveTo","x":{i},"y":0}},"#), |v| out.push(v));
    }
    ex.feed(r#"{"type":"lineTo","#, |v| out.push(v));
    for i in 100..200 {
        ex.feed(&format!(r#""pad{i}":"{}","#, "x".repeat(20)), |v| out.push(v));
    }
    ex.feed(r#""x":7,"y":8}"#, |v| out.push(v));
    assert_eq!(out.len(), 101);
    assert_eq!(out[100]["type"], "lineTo");
    assert_eq!(out[100]["x"], 7);
}
