//! Property tests: viewers that must never fail
//!
//! Raw, Hex and JavaScript accept every byte sequence and limit, and the
//! pipeline as a whole always produces an outcome.

use cview_core::views::beautify;
use cview_core::{get_content_view, Context, Line, View, Viewer};
use proptest::prelude::*;

fn trailer_count(lines: &[Line]) -> usize {
    lines
        .iter()
        .filter(|l| l.plain_text().contains("of data not shown"))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn raw_is_total(
        content in proptest::collection::vec(any::<u8>(), 0..2048),
        limit in 0usize..4096,
    ) {
        let ctx = Context::default();
        let r = View::Raw.render(&Default::default(), &content, limit, &ctx).unwrap().unwrap();
        prop_assert_eq!(r.kind, "Raw");
        prop_assert_eq!(trailer_count(&r.lines), usize::from(content.len() > limit));
        for line in &r.lines {
            prop_assert!(!line.plain_text().contains('\n'));
        }
    }

    #[test]
    fn hex_is_total(
        content in proptest::collection::vec(any::<u8>(), 0..2048),
        limit in 0usize..4096,
    ) {
        let ctx = Context::default();
        let r = View::Hex.render(&Default::default(), &content, limit, &ctx).unwrap().unwrap();
        let rows = content.len().min(limit).div_ceil(16);
        let extra = if content.len() > limit { 2 } else { 0 };
        prop_assert_eq!(r.lines.len(), rows + extra);
    }

    #[test]
    fn javascript_is_total(source in ".{0,512}", limit in 0usize..1024) {
        let ctx = Context::default();
        let r = View::JavaScript
            .render(&Default::default(), source.as_bytes(), limit, &ctx)
            .unwrap()
            .unwrap();
        prop_assert_eq!(r.kind, "JavaScript");
        let _ = beautify(&source, 2);
    }

    #[test]
    fn pipeline_always_answers(
        content in proptest::collection::vec(any::<u8>(), 0..1024),
        ct in prop::sample::select(vec![
            "application/json",
            "text/html",
            "text/xml",
            "image/png",
            "application/x-www-form-urlencoded",
            "multipart/form-data; boundary=b",
            "application/x-amf",
            "text/javascript",
        ]),
    ) {
        let outcome = get_content_view(
            &View::Auto,
            [("Content-Type", ct)],
            &content,
            512,
            &Context::default(),
            &mut |_| {},
        );
        prop_assert!(!outcome.status.is_empty());
        if content.is_empty() {
            prop_assert_eq!(outcome.status, "No content");
        }
    }
}
