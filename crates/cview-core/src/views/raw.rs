//! Raw text viewer
//!
//! Total over every input: it is what the pipeline falls back to.

use crate::lines::{render_text, truncate, Rendered};

pub(crate) fn render(content: &[u8], limit: usize) -> Rendered {
    Rendered::new("Raw", render_text(truncate(content, limit), content.len(), limit))
}
