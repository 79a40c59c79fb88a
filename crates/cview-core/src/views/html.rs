//! HTML viewer
//!
//! Lenient parse via `scraper` (html5ever), re-emitted with two-space
//! indentation. Only applies to content that sniffs as markup.

use super::xml::is_xml;
use crate::error::Result;
use crate::lines::{render_text, truncate, Rendered};
use quick_xml::escape::escape;
use scraper::{ElementRef, Html, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

const INDENT: &str = "  ";

fn open_tag(el: &ElementRef<'_>) -> String {
    let e = el.value();
    let mut tag = format!("<{}", e.name());
    for (name, value) in e.attrs() {
        tag.push_str(&format!(" {}=\"{}\"", name, escape(value)));
    }
    tag.push('>');
    tag
}

/// Indented output that stops storing text once `cap` bytes are held
///
/// `total` keeps counting so the trailer reports the full rendered size.
struct Printer {
    text: String,
    total: usize,
    cap: usize,
}

impl Printer {
    fn new(cap: usize) -> Self {
        Self {
            text: String::new(),
            total: 0,
            cap,
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        let width = INDENT.len() * depth;
        self.total = self
            .total
            .saturating_add(width)
            .saturating_add(text.len() + 1);
        if self.text.len() < self.cap {
            self.text.push_str(&INDENT.repeat(depth));
            self.text.push_str(text);
            self.text.push('\n');
        }
    }
}

enum Step<'a> {
    Enter(ElementRef<'a>, usize),
    Line(String, usize),
}

/// Emit one element and its subtree, depth-first without recursion
fn walk(root: ElementRef<'_>, out: &mut Printer) {
    let mut stack = vec![Step::Enter(root, 0)];
    while let Some(step) = stack.pop() {
        let (el, depth) = match step {
            Step::Line(text, depth) => {
                out.line(depth, &text);
                continue;
            }
            Step::Enter(el, depth) => (el, depth),
        };

        let name = el.value().name();
        let open = open_tag(&el);

        if VOID_ELEMENTS.contains(&name) {
            out.line(depth, &open);
            continue;
        }

        let close = format!("</{name}>");

        if RAW_TEXT_ELEMENTS.contains(&name) {
            let raw: String = el.text().collect();
            let raw = raw.trim_matches('\n');
            if raw.trim().is_empty() {
                out.line(depth, &format!("{open}{close}"));
            } else if !raw.contains('\n') {
                out.line(depth, &format!("{open}{raw}{close}"));
            } else {
                out.line(depth, &open);
                for line in raw.lines() {
                    out.line(0, line);
                }
                out.line(depth, &close);
            }
            continue;
        }

        // Elements holding only a short run of text stay on one line.
        let only_text = el.children().all(|c| matches!(c.value(), Node::Text(_)));
        if only_text {
            let text: String = el.text().collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            out.line(depth, &format!("{open}{}{close}", escape(text.as_str())));
            continue;
        }

        out.line(depth, &open);
        stack.push(Step::Line(close, depth));
        let children: Vec<_> = el.children().collect();
        for child in children.into_iter().rev() {
            match child.value() {
                Node::Text(t) => {
                    let text = t.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !text.is_empty() {
                        stack.push(Step::Line(escape(text.as_str()).into_owned(), depth + 1));
                    }
                }
                Node::Comment(c) => stack.push(Step::Line(format!("<!--{}-->", &**c), depth + 1)),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        stack.push(Step::Enter(child, depth + 1));
                    }
                }
                _ => {}
            }
        }
    }
}

/// Pretty-print a parsed document, keeping at most about `cap` bytes
///
/// Returns the kept text and the length of the full rendering.
pub(crate) fn pretty_html(html: &Html, cap: usize) -> (String, usize) {
    let mut out = Printer::new(cap);
    for node in html.tree.root().children() {
        match node.value() {
            Node::Doctype(d) => {
                let mut doctype = format!("<!DOCTYPE {}", d.name());
                if !d.public_id().is_empty() {
                    doctype.push_str(&format!(" PUBLIC \"{}\"", d.public_id()));
                }
                if !d.system_id().is_empty() {
                    doctype.push_str(&format!(" \"{}\"", d.system_id()));
                }
                doctype.push('>');
                out.line(0, &doctype);
            }
            Node::Comment(c) => out.line(0, &format!("<!--{}-->", &**c)),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(node) {
                    walk(el, &mut out);
                }
            }
            _ => {}
        }
    }
    (out.text, out.total)
}

pub(super) fn render(content: &[u8], limit: usize) -> Result<Option<Rendered>> {
    if !is_xml(content) {
        return Ok(None);
    }
    let html = Html::parse_document(&String::from_utf8_lossy(content));
    let (text, total) = pretty_html(&html, limit);
    Ok(Some(Rendered::new(
        "HTML",
        render_text(truncate(text.as_bytes(), limit), total, limit),
    )))
}
