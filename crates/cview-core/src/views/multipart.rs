//! Multipart form viewer
//!
//! A light splitter rather than a MIME parser: the body is cut on the
//! boundary and each part's name and value are picked out by position.

use crate::error::Result;
use crate::headers::Headers;
use crate::lines::{
    clip_lines, format_keyvals, sanitize, split_lines, Line, Rendered, StyleTag,
};
use crate::pipeline::Context;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bname="([^"]+)""#).expect("NAME_RE is a valid static regex pattern")
});

fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            pieces.push(&haystack[start..i]);
            i += needle.len();
            start = i;
        } else {
            i += 1;
        }
    }
    pieces.push(&haystack[start..]);
    pieces
}

/// Extract `(name, value)` for each named part
pub(crate) fn form_fields(content: &[u8], boundary: &str) -> Vec<(String, String)> {
    let delimiter = format!("--{boundary}");
    let mut fields = Vec::new();

    for part in split_on(content, delimiter.as_bytes()) {
        let lines = split_lines(part);
        // lines[0] is the rest of the boundary line, "--" on the closing one
        if lines.len() < 2 || lines[0].starts_with(b"--") {
            continue;
        }
        let Some(name) = NAME_RE.captures(lines[1]).and_then(|c| c.get(1)) else {
            continue;
        };
        let Some(blank) = lines[2..].iter().position(|l| l.is_empty()) else {
            continue;
        };
        let value = lines[3 + blank..]
            .iter()
            .map(|l| sanitize(l))
            .collect::<Vec<_>>()
            .join("\n");
        fields.push((sanitize(name.as_bytes()), value));
    }
    fields
}

pub(super) fn render(
    headers: &Headers,
    content: &[u8],
    limit: usize,
    ctx: &Context,
) -> Result<Option<Rendered>> {
    let Some(ct) = headers.content_type() else {
        return Ok(None);
    };
    let Some(boundary) = ct.param("boundary").filter(|b| !b.is_empty()) else {
        return Ok(None);
    };

    let fields = form_fields(content, boundary);
    if fields.is_empty() {
        return Ok(None);
    }

    let labelled: Vec<_> = fields.into_iter().map(|(k, v)| (k + ":", v)).collect();
    let mut lines = vec![Line::styled(StyleTag::Highlight, "Form data:"), Line::new()];
    lines.extend(format_keyvals(&labelled, ctx.options().key_max_width));
    Ok(Some(Rendered::new("Multipart form", clip_lines(lines, limit))))
}
