//! URL-encoded form viewer

use crate::error::Result;
use crate::lines::{clip_lines, format_keyvals, Rendered};
use crate::pipeline::Context;

/// Decode `application/x-www-form-urlencoded` pairs, keeping blank values
pub(crate) fn decode_form(content: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(content)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

pub(super) fn render(content: &[u8], limit: usize, ctx: &Context) -> Result<Option<Rendered>> {
    let pairs = decode_form(content);
    if pairs.is_empty() {
        return Ok(None);
    }
    let labelled: Vec<_> = pairs.into_iter().map(|(k, v)| (k + ":", v)).collect();
    Ok(Some(Rendered::new(
        "URLEncoded form",
        clip_lines(format_keyvals(&labelled, ctx.options().key_max_width), limit),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{Line, StyleTag};

    #[test]
    fn test_decode_keeps_blank_values() {
        let pairs = decode_form(b"a=1&b=&c=hello+world%21");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), String::new()),
                ("c".to_string(), "hello world!".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_table() {
        let r = render(b"name=bob&age=42", 1000, &Context::default()).unwrap().unwrap();
        assert_eq!(r.kind, "URLEncoded form");
        let text: Vec<_> = r.lines.iter().map(Line::plain_text).collect();
        assert_eq!(text, vec!["name:  bob", "age:   42"]);
        assert_eq!(r.lines[0].spans[0].style, StyleTag::Header);
    }

    #[test]
    fn test_render_respects_limit() {
        let body = (0..500).map(|i| format!("k{i}=v{i}")).collect::<Vec<_>>().join("&");
        let r = render(body.as_bytes(), 40, &Context::default()).unwrap().unwrap();
        assert!(r.lines.len() < 10);
        assert!(r.lines.last().unwrap().plain_text().contains("of data not shown"));

        let r = render(body.as_bytes(), usize::MAX, &Context::default()).unwrap().unwrap();
        assert_eq!(r.lines.len(), 500);
    }

    #[test]
    fn test_empty_declines() {
        assert!(render(b"", 1000, &Context::default()).unwrap().is_none());
    }
}
