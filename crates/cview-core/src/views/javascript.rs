//! JavaScript viewer
//!
//! A best-effort reformatter: tokenizes the script and re-emits it with one
//! statement per line and block indentation. It never fails; anything it
//! does not understand is passed through as-is.

use crate::lines::{render_text, truncate, Rendered};
use crate::pipeline::Context;

/// Operators, longest first so greedy matching picks the right one
const OPERATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", ">>>", "...", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

/// Keywords followed by a space before `(`
const PAREN_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "with", "return"];

/// Keywords after which `/` starts a regex literal
const REGEX_KEYWORDS: &[&str] = &["return", "typeof", "case", "do", "else", "in", "of", "void"];

/// Words that continue a statement after a closing brace
const BRACE_CONTINUATIONS: &[&str] = &["else", "catch", "finally", "while"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Str(String),
    Regex(String),
    LineComment(String),
    BlockComment(String),
    Punct(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    /// Identifier, keyword or number
    Word,
    /// String or regex literal
    Literal,
    Open,
    Close,
    Op,
    Comment,
}

struct Lexer<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self { chars, pos: 0 }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek(0).is_some_and(&f) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn string(&mut self, quote: char) -> String {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            if c == '\\' {
                self.pos = (self.pos + 1).min(self.chars.len());
            } else if c == quote || (c == '\n' && quote != '`') {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn regex(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
            match c {
                '\\' => self.pos = (self.pos + 1).min(self.chars.len()),
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }
        while self.peek(0).is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn block_comment(&mut self) -> String {
        let start = self.pos;
        self.pos += 2;
        while self.pos < self.chars.len() {
            if self.peek(0) == Some('*') && self.peek(1) == Some('/') {
                self.pos += 2;
                break;
            }
            self.pos += 1;
        }
        self.pos = self.pos.min(self.chars.len());
        self.chars[start..self.pos].iter().collect()
    }

    fn operator(&mut self) -> String {
        for op in OPERATORS {
            let len = op.chars().count();
            if self.pos + len <= self.chars.len()
                && self.chars[self.pos..self.pos + len].iter().copied().eq(op.chars())
            {
                self.pos += len;
                return (*op).to_string();
            }
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        c.to_string()
    }

    fn next(&mut self, regex_allowed: bool) -> Option<Token> {
        self.take_while(char::is_whitespace);
        let c = self.peek(0)?;
        let token = match c {
            '/' if self.peek(1) == Some('/') => {
                Token::LineComment(self.take_while(|c| c != '\n' && c != '\r'))
            }
            '/' if self.peek(1) == Some('*') => Token::BlockComment(self.block_comment()),
            '/' if regex_allowed => Token::Regex(self.regex()),
            '"' | '\'' | '`' => Token::Str(self.string(c)),
            c if is_word_char(c) => Token::Word(self.take_while(is_word_char)),
            _ => Token::Punct(self.operator()),
        };
        Some(token)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || (!c.is_ascii() && !c.is_whitespace())
}

struct Printer {
    out: String,
    indent: String,
    level: usize,
    at_line_start: bool,
    paren_depth: usize,
    ternary_depth: usize,
    after_brace: bool,
    last: Last,
    last_word: String,
}

impl Printer {
    fn new(indent_size: usize) -> Self {
        Self {
            out: String::new(),
            indent: " ".repeat(indent_size),
            level: 0,
            at_line_start: true,
            paren_depth: 0,
            ternary_depth: 0,
            after_brace: false,
            last: Last::Start,
            last_word: String::new(),
        }
    }

    fn newline(&mut self) {
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
        if !self.out.is_empty() && !self.at_line_start {
            self.out.push('\n');
        }
        self.at_line_start = true;
    }

    fn write(&mut self, s: &str) {
        if self.at_line_start {
            for _ in 0..self.level {
                self.out.push_str(&self.indent);
            }
            self.at_line_start = false;
        }
        self.out.push_str(s);
    }

    fn space(&mut self) {
        if !self.at_line_start && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    fn value_before(&self) -> bool {
        matches!(self.last, Last::Word | Last::Literal | Last::Close)
    }

    fn regex_allowed(&self) -> bool {
        match self.last {
            Last::Start | Last::Open | Last::Op | Last::Comment => true,
            Last::Word => REGEX_KEYWORDS.contains(&self.last_word.as_str()),
            Last::Literal | Last::Close => false,
        }
    }

    fn token(&mut self, token: Token) {
        if std::mem::take(&mut self.after_brace) {
            let continues = match &token {
                Token::Punct(p) => matches!(p.as_str(), ";" | "," | ")" | "]" | "." | "?."),
                Token::Word(w) => BRACE_CONTINUATIONS.contains(&w.as_str()),
                _ => false,
            };
            if !continues {
                self.newline();
            }
        }

        match token {
            Token::Word(w) => {
                if self.value_before() {
                    self.space();
                }
                self.write(&w);
                self.last = Last::Word;
                self.last_word = w;
            }
            Token::Str(s) | Token::Regex(s) => {
                if self.value_before() {
                    self.space();
                }
                self.write(&s);
                self.last = Last::Literal;
            }
            Token::LineComment(c) => {
                self.space();
                self.write(&c);
                self.newline();
                self.last = Last::Comment;
            }
            Token::BlockComment(c) => {
                if self.value_before() {
                    self.space();
                }
                self.write(&c);
                if c.contains('\n') {
                    self.newline();
                } else {
                    self.space();
                }
                self.last = Last::Comment;
            }
            Token::Punct(p) => self.punct(&p),
        }
    }

    fn punct(&mut self, p: &str) {
        match p {
            "{" => {
                self.space();
                self.write("{");
                self.level += 1;
                self.newline();
                self.last = Last::Open;
            }
            "}" => {
                self.level = self.level.saturating_sub(1);
                self.newline();
                self.write("}");
                self.after_brace = true;
                self.last = Last::Close;
            }
            ";" => {
                self.write(";");
                if self.paren_depth > 0 {
                    self.space();
                } else {
                    self.newline();
                }
                self.last = Last::Op;
            }
            "," => {
                self.write(",");
                self.space();
                self.last = Last::Op;
            }
            "(" | "[" => {
                if p == "("
                    && self.last == Last::Word
                    && PAREN_KEYWORDS.contains(&self.last_word.as_str())
                {
                    self.space();
                }
                self.write(p);
                self.paren_depth += 1;
                self.last = Last::Open;
            }
            ")" | "]" => {
                self.write(p);
                self.paren_depth = self.paren_depth.saturating_sub(1);
                self.last = Last::Close;
            }
            "." | "?." => {
                self.write(p);
                self.last = Last::Open;
            }
            "!" | "~" | "++" | "--" | "..." => {
                if matches!(p, "!" | "~" | "...") && self.value_before() {
                    self.space();
                }
                self.write(p);
                if !matches!(p, "++" | "--") || !self.value_before() {
                    self.last = Last::Op;
                }
            }
            "?" => {
                self.ternary_depth += 1;
                self.binary(p);
            }
            ":" => {
                if self.ternary_depth > 0 {
                    self.ternary_depth -= 1;
                    self.binary(p);
                } else {
                    self.write(":");
                    self.space();
                    self.last = Last::Op;
                }
            }
            "+" | "-" if !self.value_before() => {
                self.write(p);
                self.last = Last::Op;
            }
            _ => self.binary(p),
        }
    }

    fn binary(&mut self, p: &str) {
        self.space();
        self.write(p);
        self.space();
        self.last = Last::Op;
    }

    fn finish(mut self) -> String {
        self.newline();
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out
    }
}

/// Reformat `source` with `indent_size`-space indentation
pub fn beautify(source: &str, indent_size: usize) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut lexer = Lexer::new(&chars);
    let mut printer = Printer::new(indent_size);
    while let Some(token) = lexer.next(printer.regex_allowed()) {
        printer.token(token);
    }
    printer.finish()
}

pub(super) fn render(content: &[u8], limit: usize, ctx: &Context) -> Rendered {
    let source = String::from_utf8_lossy(truncate(content, limit));
    let res = beautify(&source, ctx.options().js_indent);
    Rendered::new("JavaScript", render_text(res.as_bytes(), content.len(), limit))
}
