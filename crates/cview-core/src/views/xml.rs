//! XML viewer
//!
//! Re-serializes a well-formed document with two-space indentation. The
//! whole body is parsed, so memory use is proportional to the input; only
//! the rendered text is cut to the limit.
//!
//! Entity references are carried through as written and never expanded,
//! which keeps entity-expansion payloads inert.

use crate::error::{Error, Result};
use crate::lines::{append_trailer, sanitize, split_lines, truncate, Line, Rendered, StyleTag};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use tracing::debug;

const DEFAULT_VERSION: &str = "1.0";
const DEFAULT_ENCODING: &str = "UTF-8";

/// Deepest element nesting accepted, as libxml2 does by default
const MAX_DEPTH: usize = 256;

/// Whether the first non-whitespace byte of `content` is `<`
pub fn is_xml(content: &[u8]) -> bool {
    content
        .iter()
        .find(|b| !matches!(b, b'\n' | b'\r' | b' ' | b'\t'))
        .is_some_and(|b| *b == b'<')
}

/// Position of the parser relative to the root element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Prolog,
    Root,
    Epilog,
}

struct Declaration {
    version: String,
    encoding: Option<String>,
    standalone: Option<String>,
}

impl Declaration {
    fn render(&self) -> String {
        let mut s = format!("<?xml version=\"{}\"", self.version);
        s.push_str(&format!(
            " encoding=\"{}\"",
            self.encoding.as_deref().unwrap_or(DEFAULT_ENCODING)
        ));
        if let Some(standalone) = &self.standalone {
            s.push_str(&format!(" standalone=\"{standalone}\""));
        }
        s.push_str("?>");
        s
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn fault(e: impl std::fmt::Display) -> Error {
    Error::view("XML", e.to_string())
}

/// Serialize a standalone prolog item (comment or processing instruction)
fn write_single(event: Event<'_>) -> Result<String> {
    let mut w = Writer::new(Vec::new());
    w.write_event(event).map_err(fault)?;
    Ok(lossy(&w.into_inner()))
}

/// Pretty-print `content`, or `None` if it is not well-formed XML
pub(crate) fn pretty_xml(content: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut reader = Reader::from_reader(content);

    let mut decl: Option<Declaration> = None;
    let mut doctype: Option<String> = None;
    let mut prolog: Vec<String> = Vec::new();
    let mut epilog: Vec<String> = Vec::new();
    let mut body = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut phase = Phase::Prolog;
    let mut depth = 0usize;
    let mut seen_any = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                debug!(position = reader.buffer_position(), "XML syntax error: {e}");
                return Ok(None);
            }
        };

        match event {
            Event::Eof => break,
            // Whitespace-only text is layout; other text is kept as written
            Event::Text(ref t) if t.iter().all(u8::is_ascii_whitespace) => continue,
            Event::Decl(d) => {
                if seen_any {
                    return Ok(None);
                }
                let version = match d.version() {
                    Ok(v) => lossy(&v),
                    Err(_) => return Ok(None),
                };
                let encoding = match d.encoding() {
                    Some(Ok(e)) => Some(lossy(&e)),
                    Some(Err(_)) => return Ok(None),
                    None => None,
                };
                let standalone = match d.standalone() {
                    Some(Ok(s)) => Some(lossy(&s)),
                    Some(Err(_)) => return Ok(None),
                    None => None,
                };
                decl = Some(Declaration {
                    version,
                    encoding,
                    standalone,
                });
            }
            Event::DocType(d) => {
                if phase != Phase::Prolog || doctype.is_some() {
                    return Ok(None);
                }
                doctype = Some(format!("<!DOCTYPE {}>", lossy(&d).trim()));
            }
            Event::Start(_) | Event::Empty(_) => {
                if !attributes_ok(&event) {
                    return Ok(None);
                }
                match phase {
                    Phase::Epilog => return Ok(None),
                    Phase::Prolog => phase = Phase::Root,
                    Phase::Root => {}
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                    if depth > MAX_DEPTH {
                        debug!(depth, "XML nesting too deep");
                        return Ok(None);
                    }
                } else if depth == 0 {
                    phase = Phase::Epilog;
                }
                body.write_event(event).map_err(fault)?;
            }
            Event::End(_) => {
                if depth == 0 {
                    return Ok(None);
                }
                depth -= 1;
                body.write_event(event).map_err(fault)?;
                if depth == 0 {
                    phase = Phase::Epilog;
                }
            }
            Event::Text(_) | Event::CData(_) => {
                if phase != Phase::Root {
                    return Ok(None);
                }
                body.write_event(event).map_err(fault)?;
            }
            Event::Comment(c) => match phase {
                Phase::Root => body.write_event(Event::Comment(c)).map_err(fault)?,
                Phase::Prolog => prolog.push(format!("<!--{}-->", lossy(&c))),
                Phase::Epilog => epilog.push(format!("<!--{}-->", lossy(&c))),
            },
            Event::PI(_) => match phase {
                Phase::Root => body.write_event(event).map_err(fault)?,
                Phase::Prolog => prolog.push(write_single(event)?),
                Phase::Epilog => epilog.push(write_single(event)?),
            },
        }
        seen_any = true;
    }

    if phase != Phase::Epilog || depth != 0 {
        return Ok(None);
    }

    let decl = decl.unwrap_or(Declaration {
        version: DEFAULT_VERSION.to_string(),
        encoding: None,
        standalone: None,
    });

    let mut out = decl.render().into_bytes();
    for item in doctype.iter().chain(prolog.iter()) {
        out.push(b'\n');
        out.extend_from_slice(item.as_bytes());
    }
    out.push(b'\n');
    out.extend_from_slice(trim_newlines(&body.into_inner()));
    for item in &epilog {
        out.push(b'\n');
        out.extend_from_slice(item.as_bytes());
    }
    Ok(Some(out))
}

fn attributes_ok(event: &Event<'_>) -> bool {
    match event {
        Event::Start(e) | Event::Empty(e) => e.attributes().all(|a| a.is_ok()),
        _ => true,
    }
}

fn trim_newlines(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != b'\n').unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| *b != b'\n').map_or(start, |i| i + 1);
    &bytes[start..end]
}

pub(super) fn render(content: &[u8], limit: usize) -> Result<Option<Rendered>> {
    let Some(pretty) = pretty_xml(content)? else {
        return Ok(None);
    };

    let mut txt: Vec<Line> = split_lines(truncate(&pretty, limit))
        .into_iter()
        .map(|l| Line::styled(StyleTag::Text, sanitize(l)))
        .collect();
    append_trailer(pretty.len(), limit, &mut txt);
    Ok(Some(Rendered::new("XML-like data", txt)))
}
