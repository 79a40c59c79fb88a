//! Integration tests for the rendering pipeline
//!
//! End-to-end scenarios through `get_content_view`.

use cview_core::{get_content_view, Context, Line, RenderOutcome, StyleTag, View};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

fn render(view: View, headers: &[(&str, &str)], content: &[u8], limit: usize) -> RenderOutcome {
    get_content_view(
        &view,
        headers.iter().copied(),
        content,
        limit,
        &Context::default(),
        &mut |_| {},
    )
}

fn texts(outcome: &RenderOutcome) -> Vec<String> {
    outcome.lines.iter().map(Line::plain_text).collect()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

// =========== Scenario Tests ===========

#[test]
fn test_json_via_auto() {
    let outcome = render(
        View::Auto,
        &[("Content-Type", "application/json")],
        br#"{"a":1}"#,
        1000,
    );
    assert_eq!(outcome.status, "JSON");
    assert_eq!(texts(&outcome), vec!["{", r#"    "a": 1"#, "}"]);
}

#[test]
fn test_multipart_without_boundary_falls_back() {
    let outcome = render(
        View::Auto,
        &[("Content-Type", "multipart/form-data")],
        b"--x\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nb\r\n--x--",
        1000,
    );
    assert_eq!(outcome.status, "Couldn't parse: falling back to Raw");
    assert!(!outcome.lines.is_empty());
}

#[test]
fn test_gzip_body_is_decoded() {
    let outcome = render(
        View::Auto,
        &[
            ("Content-Type", "application/json"),
            ("Content-Encoding", "gzip"),
        ],
        &gzip(br#"{"z": [1, 2]}"#),
        1000,
    );
    assert_eq!(outcome.status, "[decoded gzip] JSON");
    assert_eq!(texts(&outcome)[1], r#"    "z": ["#);
}

#[test]
fn test_corrupt_gzip_is_silent() {
    let mut logged = Vec::new();
    let outcome = get_content_view(
        &View::Raw,
        [("Content-Encoding", "gzip")],
        b"plain text",
        1000,
        &Context::default(),
        &mut |s| logged.push(s.to_string()),
    );
    assert_eq!(outcome.status, "Raw");
    assert_eq!(texts(&outcome), vec!["plain text"]);
    assert!(logged.is_empty());
}

#[test]
fn test_identity_encoding_not_reported() {
    let outcome = render(View::Raw, &[("Content-Encoding", "identity")], b"x", 1000);
    assert_eq!(outcome.status, "Raw");
}

#[test]
fn test_empty_content() {
    let outcome = render(View::Json, &[("Content-Type", "application/json")], b"", 1000);
    assert_eq!(outcome.status, "No content");
    assert!(outcome.lines.is_empty());
}

#[test]
fn test_explicit_viewer_declines_to_raw() {
    let outcome = render(View::Json, &[], b"<not json>", 1000);
    assert_eq!(outcome.status, "Couldn't parse: falling back to Raw");
    assert_eq!(texts(&outcome), vec!["<not json>"]);
}

#[test]
fn test_auto_sniffs_xml_for_unknown_type() {
    let outcome = render(
        View::Auto,
        &[("Content-Type", "application/x-custom")],
        b"<a><b/></a>",
        1000,
    );
    assert_eq!(outcome.status, "XML-like data");
}

#[test]
fn test_auto_without_content_type_is_raw() {
    let outcome = render(View::Auto, &[], br#"{"a":1}"#, 1000);
    assert_eq!(outcome.status, "Raw");
}

// =========== Truncation Tests ===========

#[test]
fn test_raw_truncation_accounting() {
    let outcome = render(View::Raw, &[], &[b'a'; 3000], 1000);
    let last = outcome.lines.last().unwrap();
    assert_eq!(last.plain_text(), "... 1.95kB of data not shown. Press f to load all data.");
    assert_eq!(last.spans[1].style, StyleTag::Key);
    assert!(outcome.lines[outcome.lines.len() - 2].is_empty());
}

#[test]
fn test_no_trailer_within_limit() {
    let outcome = render(View::Raw, &[], &[b'a'; 1000], 1000);
    assert_eq!(outcome.lines.len(), 1);

    let outcome = render(View::Hex, &[], &[0u8; 64], 64);
    assert_eq!(outcome.lines.len(), 4);
}

#[test]
fn test_hex_truncation_accounting() {
    let outcome = render(View::Hex, &[], &[0u8; 100], 32);
    let last = outcome.lines.last().unwrap().plain_text();
    assert!(last.starts_with("... 68B of data not shown"));
}

// =========== Determinism Tests ===========

#[test]
fn test_auto_dispatch_is_deterministic() {
    let headers = [("Content-Type", "application/json; charset=utf-8")];
    let first = render(View::Auto, &headers, br#"{"k":[1,2,3]}"#, 1000);
    for _ in 0..10 {
        assert_eq!(render(View::Auto, &headers, br#"{"k":[1,2,3]}"#, 1000), first);
    }
}

#[test]
fn test_xml_is_idempotent() {
    let doc = b"<?xml version=\"1.0\"?><!-- lead --><r a=\"1\"><x>1</x><y><z/></y></r>";
    let once = texts(&render(View::Xml, &[], doc, 10_000)).join("\n");
    let twice = texts(&render(View::Xml, &[], once.as_bytes(), 10_000)).join("\n");
    assert_eq!(once, twice);
}
