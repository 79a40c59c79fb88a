//! JSON viewer
//!
//! Parses the whole body, so memory use is proportional to the input, and
//! prints it with sorted keys.

use crate::error::Result;
use crate::lines::{clip_lines, Line, Rendered, StyleTag};
use crate::pipeline::Context;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

/// Pretty-print `content` as JSON lines, or `None` if it is not JSON
pub(crate) fn pretty_json(content: &[u8], indent: usize) -> Result<Option<Vec<String>>> {
    let Ok(value) = serde_json::from_slice::<Value>(content) else {
        return Ok(None);
    };

    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;

    let text = String::from_utf8_lossy(&out);
    Ok(Some(text.lines().map(str::to_string).collect()))
}

pub(super) fn render(content: &[u8], limit: usize, ctx: &Context) -> Result<Option<Rendered>> {
    let Some(lines) = pretty_json(content, ctx.options().json_indent)? else {
        return Ok(None);
    };

    let txt = lines
        .into_iter()
        .map(|line| Line::styled(StyleTag::Text, line))
        .collect();
    Ok(Some(Rendered::new("JSON", clip_lines(txt, limit))))
}
