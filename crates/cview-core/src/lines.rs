//! Styled text lines and output budgeting
//!
//! Viewers produce [`Line`]s made of [`Span`]s. The helpers here turn bytes
//! into sanitized lines, cut output to the byte budget, and append the
//! "data not shown" trailer every truncating viewer must emit.

use serde::Serialize;

/// Key that loads the full body in an interactive front end
pub const LOAD_ALL_KEY: &str = "f";

/// Placeholder for bytes that cannot be displayed
const PLACEHOLDER: char = '.';

/// Opaque style tag attached to every span
///
/// The core never interprets these; the presentation layer maps them to
/// colours or attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    /// Unstyled filler (indentation, gutters)
    Plain,
    /// Body text
    Text,
    /// Notices such as the trailer
    Highlight,
    /// A key the user can press
    Key,
    /// Byte offsets in hex dumps
    Offset,
    /// Keys of key/value tables
    Header,
}

/// A run of text with a single style
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Style tag
    pub style: StyleTag,
    /// Text content, never containing a newline
    pub text: String,
}

/// One rendered line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    /// Spans in display order
    pub spans: Vec<Span>,
}

impl Line {
    /// Create an empty line
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Create a line holding a single span
    pub fn styled(style: StyleTag, text: impl Into<String>) -> Self {
        let mut line = Self::new();
        line.push(style, text);
        line
    }

    /// Append a span
    pub fn push(&mut self, style: StyleTag, text: impl Into<String>) {
        self.spans.push(Span {
            style,
            text: text.into(),
        });
    }

    /// Builder-style [`Line::push`]
    #[must_use]
    pub fn with(mut self, style: StyleTag, text: impl Into<String>) -> Self {
        self.push(style, text);
        self
    }

    /// Concatenated text of all spans, without styles
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Total byte length of the line's text
    pub fn text_len(&self) -> usize {
        self.spans.iter().map(|s| s.text.len()).sum()
    }

    /// Whether the line has no visible text
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }
}

/// Output of a viewer that accepted the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    /// Human readable description of what was rendered ("JSON", "PNG image")
    pub kind: String,
    /// Rendered lines
    pub lines: Vec<Line>,
}

impl Rendered {
    /// Create a rendered result
    pub fn new(kind: impl Into<String>, lines: Vec<Line>) -> Self {
        Self {
            kind: kind.into(),
            lines,
        }
    }
}

/// Cut `content` to at most `limit` bytes without splitting a UTF-8 sequence
///
/// The cut moves back at most three bytes, so arbitrary binary data is still
/// cut close to the limit.
pub fn truncate(content: &[u8], limit: usize) -> &[u8] {
    if content.len() <= limit {
        return content;
    }
    let mut end = limit;
    while end > 0 && limit - end < 3 && is_continuation(content[end]) {
        end -= 1;
    }
    // Not a real character boundary after all; keep the plain byte cut.
    if is_continuation(content[end]) {
        end = limit;
    }
    &content[..end]
}

/// [`truncate`] for strings, snapping to a char boundary
pub fn truncate_str(content: &str, limit: usize) -> &str {
    if content.len() <= limit {
        return content;
    }
    let mut end = limit;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Split on `\n`, `\r\n` and `\r`; a trailing terminator adds no empty line
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                if content.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Make bytes safe to display on a single line
///
/// Valid UTF-8 is kept except control characters; tabs survive. Control
/// characters and every invalid byte become `.`.
pub fn sanitize(content: &[u8]) -> String {
    let mut out = String::with_capacity(content.len());
    for chunk in content.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '\t' || !c.is_control() {
                out.push(c);
            } else {
                out.push(PLACEHOLDER);
            }
        }
        for _ in chunk.invalid() {
            out.push(PLACEHOLDER);
        }
    }
    out
}

/// Render a chunk of (already truncated) text as lines, plus the trailer
pub fn render_text(content: &[u8], total: usize, limit: usize) -> Vec<Line> {
    let mut lines: Vec<Line> = split_lines(content)
        .into_iter()
        .map(|l| Line::styled(StyleTag::Text, sanitize(l)))
        .collect();
    append_trailer(total, limit, &mut lines);
    lines
}

/// Append the "not shown" notice when `total` exceeds `limit`
pub fn append_trailer(total: usize, limit: usize, lines: &mut Vec<Line>) {
    let Some(rem) = total.checked_sub(limit).filter(|r| *r > 0) else {
        return;
    };
    lines.push(Line::new());
    lines.push(
        Line::new()
            .with(
                StyleTag::Highlight,
                format!("... {} of data not shown. Press ", pretty_size(rem as u64)),
            )
            .with(StyleTag::Key, LOAD_ALL_KEY)
            .with(StyleTag::Highlight, " to load all data."),
    );
}

/// Human readable size: `100B`, `1.5kB`, `2MB`
pub fn pretty_size(size: u64) -> String {
    const SUFFIXES: [(&str, u64); 4] = [
        ("B", 1 << 10),
        ("kB", 1 << 20),
        ("MB", 1 << 30),
        ("GB", 1 << 40),
    ];

    let (suffix, lim) = SUFFIXES
        .iter()
        .copied()
        .find(|(_, lim)| size < *lim)
        .unwrap_or(SUFFIXES[SUFFIXES.len() - 1]);

    let x = size as f64 / (lim >> 10) as f64;
    let x = (x * 100.0).round() / 100.0;
    if x.fract() == 0.0 {
        format!("{}{suffix}", x as u64)
    } else {
        format!("{x}{suffix}")
    }
}

/// Keep whole lines while their running text length stays within `limit`
///
/// The line that crosses the limit is still kept, so output overshoots by at
/// most one line. The trailer counts the text of every line.
pub fn clip_lines(mut lines: Vec<Line>, limit: usize) -> Vec<Line> {
    let total: usize = lines.iter().map(Line::text_len).sum();
    let mut sofar = 0usize;
    if let Some(crossing) = lines.iter().position(|line| {
        sofar += line.text_len();
        sofar > limit
    }) {
        lines.truncate(crossing + 1);
    }
    append_trailer(total, limit, &mut lines);
    lines
}

/// Lay out key/value pairs as an aligned two-column table
///
/// The key column is as wide as the longest key, clamped to `key_max_width`
/// characters. Multi-line values continue under the value column.
pub fn format_keyvals<K, V>(pairs: &[(K, V)], key_max_width: usize) -> Vec<Line>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let width = pairs
        .iter()
        .map(|(k, _)| k.as_ref().chars().count())
        .max()
        .unwrap_or(0)
        .min(key_max_width);

    let mut lines = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let key = sanitize(key.as_ref().as_bytes());
        let mut value_lines = split_lines(value.as_ref().as_bytes()).into_iter();

        let first = value_lines.next().map(sanitize).unwrap_or_default();
        lines.push(
            Line::new()
                .with(StyleTag::Header, format!("{key:<width$}"))
                .with(StyleTag::Plain, "  ")
                .with(StyleTag::Text, first),
        );
        for cont in value_lines {
            lines.push(
                Line::new()
                    .with(StyleTag::Plain, " ".repeat(width + 2))
                    .with(StyleTag::Text, sanitize(cont)),
            );
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::plain_text).collect()
    }

    #[test]
    fn test_clip_lines() {
        let lines: Vec<Line> = (0..10)
            .map(|i| Line::styled(StyleTag::Text, format!("line {i}")))
            .collect();

        let all = clip_lines(lines.clone(), 1000);
        assert_eq!(all.len(), 10);

        // 6 bytes per line: the third line crosses 15 and is still kept
        let clipped = clip_lines(lines, 15);
        assert_eq!(texts(&clipped[..3]), vec!["line 0", "line 1", "line 2"]);
        assert!(clipped[3].is_empty());
        assert!(clipped[4].plain_text().starts_with("... 45B of data not shown"));
        assert_eq!(clipped.len(), 5);
    }

    #[test]
    fn test_split_lines_mixed_terminators() {
        let lines = split_lines(b"a\nb\r\nc\rd\n");
        assert_eq!(lines, vec![&b"a"[..], b"b", b"c", b"d"]);
        assert!(split_lines(b"").is_empty());
        assert_eq!(split_lines(b"\n\n").len(), 2);
    }

    #[test]
    fn test_sanitize_replaces_control_and_invalid() {
        assert_eq!(sanitize(b"ok\tfine"), "ok\tfine");
        assert_eq!(sanitize(b"a\x00b\x1b"), "a.b.");
        assert_eq!(sanitize(b"\xff\xfeok"), "..ok");
        assert_eq!(sanitize("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_truncate_snaps_to_char_boundary() {
        let s = "aé".as_bytes(); // 'é' is two bytes
        assert_eq!(truncate(s, 2), b"a");
        assert_eq!(truncate(s, 3), s);
        assert_eq!(truncate(b"abcdef", 3), b"abc");
        assert_eq!(truncate(b"abc", 0), b"");
    }

    #[test]
    fn test_truncate_binary_continuation_run() {
        let data = [0x80u8; 16];
        assert_eq!(truncate(&data, 8).len(), 8);
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("aéb", 2), "a");
        assert_eq!(truncate_str("abc", 10), "abc");
    }

    #[test]
    fn test_pretty_size() {
        assert_eq!(pretty_size(0), "0B");
        assert_eq!(pretty_size(100), "100B");
        assert_eq!(pretty_size(1024), "1kB");
        assert_eq!(pretty_size(1536), "1.5kB");
        assert_eq!(pretty_size(2 * 1024 * 1024), "2MB");
        assert_eq!(pretty_size(3 << 30), "3GB");
    }

    #[test]
    fn test_trailer_only_when_truncated() {
        let mut lines = Vec::new();
        append_trailer(10, 10, &mut lines);
        assert!(lines.is_empty());

        append_trailer(2058, 10, &mut lines);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].is_empty());
        assert_eq!(
            lines[1].plain_text(),
            "... 2kB of data not shown. Press f to load all data."
        );
        assert_eq!(lines[1].spans[1].style, StyleTag::Key);
    }

    #[test]
    fn test_render_text() {
        let lines = render_text(b"one\ntwo", 7, 100);
        assert_eq!(texts(&lines), vec!["one", "two"]);
        assert!(lines.iter().all(|l| l.spans[0].style == StyleTag::Text));
    }

    #[test]
    fn test_format_keyvals_alignment() {
        let lines = format_keyvals(&[("a:", "1"), ("long:", "2\n3")], 30);
        assert_eq!(
            texts(&lines),
            vec!["a:     1", "long:  2", "       3"]
        );
    }

    #[test]
    fn test_format_keyvals_clamps_width() {
        let long = "k".repeat(40);
        let lines = format_keyvals(&[(long.as_str(), "v"), ("x", "y")], 30);
        assert_eq!(lines[1].spans[0].text.len(), 30);
    }
}
