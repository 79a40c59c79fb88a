//! # cview core
//!
//! UI-independent content viewers for captured HTTP message bodies.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Viewers** - Raw, Hex, JSON, XML, HTML, HTML outline, JavaScript,
//!   URL-encoded and multipart forms, images and (optionally) AMF
//! - **Registry** - Lookup by MIME type, shortcut and name
//! - **Pipeline** - Content decoding, fault isolation and Raw fallback
//! - **Configuration** - TOML-backed settings for limits and layout
//!
//! Output is a list of styled [`Line`]s; drawing them is up to the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cview_core::{get_content_view, Context, View};
//!
//! let headers = [("Content-Type", "application/json")];
//! let outcome = get_content_view(
//!     &View::Auto,
//!     headers,
//!     br#"{"a": 1}"#,
//!     50 * 1024,
//!     &Context::default(),
//!     &mut |msg| eprintln!("{msg}"),
//! );
//! assert_eq!(outcome.status, "JSON");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod lines;
pub mod pipeline;
pub mod registry;
pub mod views;

// Re-exports for convenience
pub use config::{Config, ViewOptions};
pub use error::{Error, Result};
pub use headers::{ContentType, Headers};
pub use lines::{Line, Rendered, Span, StyleTag};
pub use pipeline::{get_content_view, ContentView, Context, RenderOutcome};
pub use registry::{Capabilities, Registry};
pub use views::{View, Viewer};
