//! Message headers as seen by the viewers
//!
//! [`Headers`] is an ordered, case-insensitive multimap built from the raw
//! header list the caller captured. [`ContentType`] parses a `Content-Type`
//! value into its `type/subtype` token and parameters.

use std::collections::BTreeMap;

/// Ordered header list with case-insensitive lookup
///
/// Duplicate names are kept in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    items: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a header set from `(name, value)` pairs
    pub fn from_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: items
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a header, keeping any existing ones with the same name
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.items.push((name.into(), value.into()));
    }

    /// First value for `name`, if any
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name` in arrival order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.items
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed first `Content-Type` header
    pub fn content_type(&self) -> Option<ContentType> {
        self.get_first("content-type").and_then(ContentType::parse)
    }

    /// Iterate over all `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of header lines
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no headers
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A parsed `Content-Type` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Top-level type, lowercased (`text`)
    pub main: String,
    /// Subtype, lowercased (`html`)
    pub sub: String,
    /// Parameters keyed by lowercased name, values unquoted
    pub params: BTreeMap<String, String>,
}

impl ContentType {
    /// Parse a header value like `text/html; charset="utf-8"`
    ///
    /// Returns `None` when there is no `/` separating type and subtype.
    pub fn parse(value: &str) -> Option<Self> {
        let (main, rest) = value.split_once('/')?;
        let (sub, params) = match rest.split_once(';') {
            Some((sub, params)) => (sub, Some(params)),
            None => (rest, None),
        };

        let main = main.trim().to_ascii_lowercase();
        let sub = sub.trim().to_ascii_lowercase();
        if main.is_empty() || sub.is_empty() {
            return None;
        }

        let mut parsed = BTreeMap::new();
        for clause in params.into_iter().flat_map(|p| p.split(';')) {
            if let Some((k, v)) = clause.split_once('=') {
                let v = v.trim();
                let v = v
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(v);
                parsed.insert(k.trim().to_ascii_lowercase(), v.to_string());
            }
        }

        Some(Self {
            main,
            sub,
            params: parsed,
        })
    }

    /// The `type/subtype` token used for viewer dispatch
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }

    /// Look up a parameter such as `boundary` or `charset`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_first_case_insensitive() {
        let headers = Headers::from_items([
            ("Content-Type", "text/html"),
            ("content-type", "application/json"),
        ]);

        assert_eq!(headers.get_first("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(headers.get_all("content-type").count(), 2);
        assert_eq!(headers.get_first("x-missing"), None);
    }

    #[test]
    fn test_push_preserves_order() {
        let mut headers = Headers::new();
        headers.push("Set-Cookie", "a=1");
        headers.push("Set-Cookie", "b=2");

        let all: Vec<_> = headers.get_all("set-cookie").collect();
        assert_eq!(all, vec!["a=1", "b=2"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_parse_content_type() {
        let ct = ContentType::parse("Text/HTML; charset=UTF-8").unwrap();
        assert_eq!(ct.essence(), "text/html");
        assert_eq!(ct.param("charset"), Some("UTF-8"));
    }

    #[test]
    fn test_parse_quoted_boundary() {
        let ct = ContentType::parse("multipart/form-data; boundary=\"abc def\"").unwrap();
        assert_eq!(ct.param("Boundary"), Some("abc def"));
    }

    #[test]
    fn test_parse_invalid_content_type() {
        assert!(ContentType::parse("garbage").is_none());
        assert!(ContentType::parse("/json").is_none());
    }
}
