//! Content viewers
//!
//! Every viewer implements the [`Viewer`] trait. The built-in viewers form a
//! closed set, [`View`], so registry dispatch is an exhaustive `match`
//! rather than a table of trait objects.
//!
//! A viewer answers one of three ways:
//! - `Ok(Some(rendered))`: the content matched and was rendered
//! - `Ok(None)`: the content does not look like what this viewer handles
//! - `Err(_)` (or a panic): an internal fault, contained by the pipeline

#[cfg(feature = "amf")]
mod amf;
mod auto;
mod hex;
mod html;
mod image;
mod javascript;
mod json;
mod multipart;
mod outline;
mod raw;
mod urlencoded;
mod xml;

pub use auto::resolve;
pub use javascript::beautify;
pub(crate) use raw::render as render_raw;
pub use xml::is_xml;

use crate::error::Result;
use crate::headers::Headers;
use crate::lines::Rendered;
use crate::pipeline::Context;

/// Trait for content viewers
///
/// Implementations must not keep references to `headers` or `content`
/// past the call and must not mutate shared state.
#[cfg_attr(test, mockall::automock)]
pub trait Viewer: Send + Sync {
    /// Display name, unique within a registry
    fn name(&self) -> &'static str;

    /// Single-key shortcut, unique within a registry
    fn shortcut(&self) -> char;

    /// MIME `type/subtype` tokens this viewer is a candidate for
    fn content_types(&self) -> &'static [&'static str];

    /// Render `content` with at most `limit` bytes of output text
    fn render(
        &self,
        headers: &Headers,
        content: &[u8],
        limit: usize,
        ctx: &Context,
    ) -> Result<Option<Rendered>>;
}

/// The built-in viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Picks a concrete viewer from the declared or sniffed content type
    Auto,
    /// Sanitized text, the universal fallback
    Raw,
    /// Offset / hex / ASCII dump
    Hex,
    /// Pretty-printed JSON
    Json,
    /// Canonical indented XML
    Xml,
    /// Indented HTML from a lenient parse
    Html,
    /// HTML converted to an outline of plain text
    HtmlOutline,
    /// Reformatted script text
    JavaScript,
    /// `application/x-www-form-urlencoded` key/value table
    UrlEncoded,
    /// `multipart/form-data` field table
    Multipart,
    /// Image format, size and metadata
    Image,
    /// Flash remoting (AMF0) envelope
    #[cfg(feature = "amf")]
    Amf,
}

impl View {
    /// Built-in viewers in registration order, excluding optional ones
    pub const BUILTIN: [View; 11] = [
        View::Auto,
        View::Raw,
        View::Hex,
        View::Json,
        View::Xml,
        View::Html,
        View::HtmlOutline,
        View::JavaScript,
        View::UrlEncoded,
        View::Multipart,
        View::Image,
    ];

    /// Lowercase prompt label used in selection menus
    pub fn prompt(self) -> (String, char) {
        (self.name().to_lowercase(), self.shortcut())
    }
}

impl Viewer for View {
    fn name(&self) -> &'static str {
        match self {
            View::Auto => "Auto",
            View::Raw => "Raw",
            View::Hex => "Hex",
            View::Json => "JSON",
            View::Xml => "XML",
            View::Html => "HTML",
            View::HtmlOutline => "HTML Outline",
            View::JavaScript => "JavaScript",
            View::UrlEncoded => "URL-encoded",
            View::Multipart => "Multipart Form",
            View::Image => "Image",
            #[cfg(feature = "amf")]
            View::Amf => "AMF",
        }
    }

    fn shortcut(&self) -> char {
        match self {
            View::Auto => 'a',
            View::Raw => 'r',
            View::Hex => 'e',
            View::Json => 'j',
            View::Xml => 'x',
            View::Html => 'h',
            View::HtmlOutline => 'o',
            View::JavaScript => 's',
            View::UrlEncoded => 'u',
            View::Multipart => 'm',
            View::Image => 'i',
            #[cfg(feature = "amf")]
            View::Amf => 'f',
        }
    }

    fn content_types(&self) -> &'static [&'static str] {
        match self {
            View::Auto | View::Raw | View::Hex => &[],
            View::Json => &["application/json"],
            View::Xml => &["text/xml", "application/xml"],
            View::Html | View::HtmlOutline => &["text/html"],
            View::JavaScript => &[
                "application/x-javascript",
                "application/javascript",
                "text/javascript",
            ],
            View::UrlEncoded => &["application/x-www-form-urlencoded"],
            View::Multipart => &["multipart/form-data"],
            View::Image => &[
                "image/png",
                "image/jpeg",
                "image/gif",
                "image/vnd.microsoft.icon",
                "image/x-icon",
            ],
            #[cfg(feature = "amf")]
            View::Amf => &["application/x-amf"],
        }
    }

    fn render(
        &self,
        headers: &Headers,
        content: &[u8],
        limit: usize,
        ctx: &Context,
    ) -> Result<Option<Rendered>> {
        match self {
            View::Auto => auto::render(headers, content, limit, ctx),
            View::Raw => Ok(Some(raw::render(content, limit))),
            View::Hex => Ok(Some(hex::render(content, limit))),
            View::Json => json::render(content, limit, ctx),
            View::Xml => xml::render(content, limit),
            View::Html => html::render(content, limit),
            View::HtmlOutline => outline::render(content, limit),
            View::JavaScript => Ok(Some(javascript::render(content, limit, ctx))),
            View::UrlEncoded => urlencoded::render(content, limit, ctx),
            View::Multipart => multipart::render(headers, content, limit, ctx),
            View::Image => image::render(content, limit, ctx),
            #[cfg(feature = "amf")]
            View::Amf => amf::render(content, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_and_shortcuts_unique() {
        let names: HashSet<_> = View::BUILTIN.iter().map(|v| v.name()).collect();
        let keys: HashSet<_> = View::BUILTIN.iter().map(|v| v.shortcut()).collect();
        assert_eq!(names.len(), View::BUILTIN.len());
        assert_eq!(keys.len(), View::BUILTIN.len());
    }

    #[test]
    fn test_prompt() {
        assert_eq!(View::HtmlOutline.prompt(), ("html outline".to_string(), 'o'));
    }
}
