//! Automatic viewer selection

use super::xml::is_xml;
use super::{View, Viewer};
use crate::error::Result;
use crate::headers::Headers;
use crate::lines::Rendered;
use crate::pipeline::Context;
use crate::registry::Registry;
use tracing::debug;

/// Pick the viewer for `content` from its declared content type
///
/// The first registered candidate for the MIME type wins. An unregistered
/// type falls back to XML when the body looks like markup, otherwise to
/// Raw. Without a `Content-Type` header the answer is always Raw.
pub fn resolve(headers: &Headers, content: &[u8], registry: &Registry) -> View {
    let Some(value) = headers.get_first("content-type") else {
        debug!("No content type; using Raw");
        return View::Raw;
    };

    let essence = headers
        .content_type()
        .map_or_else(|| value.trim().to_ascii_lowercase(), |ct| ct.essence());

    if let Some(view) = registry.candidates_for_type(&essence).first() {
        debug!(content_type = %essence, view = view.name(), "Resolved viewer");
        return *view;
    }
    if is_xml(content) {
        debug!(content_type = %essence, "Unknown content type sniffed as XML");
        return View::Xml;
    }
    debug!(content_type = %essence, "Unknown content type; using Raw");
    View::Raw
}

pub(super) fn render(
    headers: &Headers,
    content: &[u8],
    limit: usize,
    ctx: &Context,
) -> Result<Option<Rendered>> {
    let view = resolve(headers, content, ctx.registry());
    if view == View::Auto {
        return Ok(None);
    }
    view.render(headers, content, limit, ctx)
}
