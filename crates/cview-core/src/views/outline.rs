//! HTML outline viewer
//!
//! Converts HTML to a plain-text outline: headings, paragraphs, lists and
//! links survive, images and scripts do not, and lines are never wrapped.

use crate::error::Result;
use crate::lines::{render_text, truncate, Rendered};
use scraper::{ElementRef, Html, Node};

const SKIPPED: &[&str] = &["head", "script", "style", "noscript", "template", "img", "svg"];

const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "aside", "blockquote", "table", "tr", "form", "header",
    "footer", "nav", "main", "figure", "dl", "dt", "dd", "address", "fieldset",
];

/// Work left for an element once its children are done
enum Exit {
    Inline,
    Block,
    List,
    Item,
    Link(String),
    Cell,
}

enum Step<'a> {
    Enter(ElementRef<'a>),
    Text(&'a str),
    Exit(Exit),
}

#[derive(Default)]
struct Outline {
    lines: Vec<String>,
    current: String,
    list_depth: usize,
}

impl Outline {
    /// Append inline text, collapsing runs of whitespace to one space
    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let leading = raw.starts_with(char::is_whitespace);
        let trailing = raw.ends_with(char::is_whitespace);
        let words = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        if leading && !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        self.current.push_str(&words);
        if trailing && !words.is_empty() {
            self.current.push(' ');
        }
    }

    /// Finish the current line
    fn newline(&mut self) {
        let line = self.current.trim_end().to_string();
        self.current.clear();
        if !line.trim().is_empty() {
            self.lines.push(line);
        }
    }

    /// Finish the current line and leave one blank line
    fn block(&mut self) {
        self.newline();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Walk an element's subtree depth-first without recursion
    fn element(&mut self, root: ElementRef<'_>) {
        let mut stack = vec![Step::Enter(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Text(t) => self.text(t),
                Step::Exit(exit) => self.exit(exit),
                Step::Enter(el) => {
                    let Some(exit) = self.enter(el) else {
                        continue;
                    };
                    stack.push(Step::Exit(exit));
                    let children: Vec<_> = el.children().collect();
                    for child in children.into_iter().rev() {
                        match child.value() {
                            Node::Text(t) => stack.push(Step::Text(&**t)),
                            Node::Element(_) => {
                                if let Some(child) = ElementRef::wrap(child) {
                                    stack.push(Step::Enter(child));
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    /// Output on entering an element; `None` when its children are not visited
    fn enter(&mut self, el: ElementRef<'_>) -> Option<Exit> {
        let name = el.value().name();
        if SKIPPED.contains(&name) {
            return None;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.block();
                self.current.push_str(&"#".repeat(level));
                self.current.push(' ');
                Some(Exit::Block)
            }
            "br" => {
                self.newline();
                None
            }
            "hr" => {
                self.block();
                self.lines.push("* * *".to_string());
                self.block();
                None
            }
            "ul" | "ol" => {
                if self.list_depth == 0 {
                    self.block();
                } else {
                    self.newline();
                }
                self.list_depth += 1;
                Some(Exit::List)
            }
            "li" => {
                self.newline();
                self.current
                    .push_str(&"  ".repeat(self.list_depth.saturating_sub(1)));
                self.current.push_str("  * ");
                Some(Exit::Item)
            }
            "a" => match el.value().attr("href").filter(|h| !h.is_empty()) {
                Some(href) => {
                    self.current.push('[');
                    Some(Exit::Link(href.to_string()))
                }
                None => Some(Exit::Inline),
            },
            "pre" => {
                self.block();
                let raw: String = el.text().collect();
                for line in raw.trim_matches('\n').lines() {
                    self.lines.push(format!("    {line}"));
                }
                self.block();
                None
            }
            "td" | "th" => Some(Exit::Cell),
            _ if BLOCKS.contains(&name) => {
                self.block();
                Some(Exit::Block)
            }
            _ => Some(Exit::Inline),
        }
    }

    fn exit(&mut self, exit: Exit) {
        match exit {
            Exit::Inline => {}
            Exit::Block => self.block(),
            Exit::List => {
                self.list_depth -= 1;
                if self.list_depth == 0 {
                    self.block();
                }
            }
            Exit::Item => self.newline(),
            Exit::Link(href) => {
                let trimmed = self.current.trim_end().len();
                self.current.truncate(trimmed);
                self.current.push_str(&format!("]({href})"));
            }
            Exit::Cell => self.text(" "),
        }
    }

    fn finish(mut self) -> String {
        self.newline();
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Convert an HTML document to outline text
pub(crate) fn html_to_text(source: &str) -> String {
    let html = Html::parse_document(source);
    let mut outline = Outline::default();
    for node in html.tree.root().children() {
        if let Some(el) = ElementRef::wrap(node) {
            outline.element(el);
        }
    }
    outline.finish()
}

pub(super) fn render(content: &[u8], limit: usize) -> Result<Option<Rendered>> {
    let Ok(source) = std::str::from_utf8(content) else {
        return Ok(None);
    };
    let text = html_to_text(source);
    Ok(Some(Rendered::new(
        "HTML Outline",
        render_text(truncate(text.as_bytes(), limit), text.len(), limit),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_structure() {
        let text = html_to_text(
            "<html><head><title>T</title><script>x()</script></head><body>\
             <h2>Title</h2><p>Some   <b>bold</b>\ntext</p>\
             <ul><li>one</li><li><a href=\"/two\">two</a></li></ul>\
             <img src=\"a.png\"></body></html>",
        );
        assert_eq!(
            text,
            "## Title\n\nSome bold text\n\n  * one\n  * [two](/two)\n"
        );
    }

    #[test]
    fn test_br_and_nested_lists() {
        let text = html_to_text("<p>a<br>b</p><ul><li>x<ul><li>y</li></ul></li></ul>");
        assert_eq!(text, "a\nb\n\n  * x\n    * y\n");
    }

    #[test]
    fn test_deep_nesting() {
        let source = format!("{}deep", "<div>".repeat(100_000));
        assert_eq!(html_to_text(&source), "deep\n");
    }

    #[test]
    fn test_invalid_utf8_declines() {
        assert!(render(b"<p>\xff</p>", 100).unwrap().is_none());
    }

    #[test]
    fn test_render_kind() {
        let r = render(b"<p>hello</p>", 100).unwrap().unwrap();
        assert_eq!(r.kind, "HTML Outline");
        assert_eq!(r.lines[0].plain_text(), "hello");
    }
}
