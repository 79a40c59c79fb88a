//! Viewer registry
//!
//! An immutable table of viewers with lookup by MIME type, shortcut and
//! name. The process-wide instance is built once on first use.

use crate::error::{Error, Result};
use crate::views::{View, Viewer};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

static GLOBAL: Lazy<Arc<Registry>> =
    Lazy::new(|| Arc::new(Registry::new(Capabilities::detect())));

/// Optional viewers available to a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Flash remoting (AMF) decoding
    pub amf: bool,
}

impl Capabilities {
    /// Capabilities compiled into this build
    pub fn detect() -> Self {
        Self {
            amf: cfg!(feature = "amf"),
        }
    }

    /// Restrict to what the configuration enables
    pub fn with_config(self, amf_enabled: bool) -> Self {
        Self {
            amf: self.amf && amf_enabled,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Registered viewers and their lookup indexes
#[derive(Debug, Clone)]
pub struct Registry {
    views: Vec<View>,
    by_type: HashMap<&'static str, Vec<View>>,
    by_shortcut: HashMap<char, View>,
}

impl Registry {
    /// Build the registry of built-in viewers
    pub fn new(caps: Capabilities) -> Self {
        #[allow(unused_mut)]
        let mut views = View::BUILTIN.to_vec();
        #[cfg(feature = "amf")]
        if caps.amf {
            views.push(View::Amf);
        }
        #[cfg(not(feature = "amf"))]
        let _ = caps;

        // Built-in names and shortcuts are distinct.
        Self::index(views)
    }

    /// Build a registry from an explicit list, in order
    ///
    /// Fails if two viewers share a name (case-insensitively) or a shortcut.
    pub fn with_views(views: Vec<View>) -> Result<Self> {
        let mut names = HashMap::new();
        let mut keys = HashMap::new();
        for view in &views {
            if names.insert(view.name().to_lowercase(), *view).is_some() {
                return Err(Error::DuplicateView {
                    what: "name",
                    value: view.name().to_string(),
                });
            }
            if keys.insert(view.shortcut(), *view).is_some() {
                return Err(Error::DuplicateView {
                    what: "shortcut",
                    value: view.shortcut().to_string(),
                });
            }
        }
        Ok(Self::index(views))
    }

    fn index(views: Vec<View>) -> Self {
        let mut by_type: HashMap<&'static str, Vec<View>> = HashMap::new();
        let mut by_shortcut = HashMap::new();
        for view in &views {
            for ct in view.content_types() {
                by_type.entry(*ct).or_default().push(*view);
            }
            by_shortcut.entry(view.shortcut()).or_insert(*view);
        }
        debug!(count = views.len(), "Viewer registry built");
        Self {
            views,
            by_type,
            by_shortcut,
        }
    }

    /// Viewers in registration order
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// `(prompt label, shortcut)` pairs for a selection menu
    pub fn prompts(&self) -> Vec<(String, char)> {
        self.views.iter().map(|v| v.prompt()).collect()
    }

    /// Viewer bound to a shortcut key
    pub fn by_shortcut(&self, key: char) -> Option<View> {
        self.by_shortcut.get(&key).copied()
    }

    /// Viewer by display name, ignoring case
    pub fn by_name(&self, name: &str) -> Option<View> {
        self.views
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Viewer by name, prompt label or single-character shortcut
    pub fn lookup(&self, query: &str) -> Result<View> {
        let query = query.trim();
        let mut chars = query.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(view) = self.by_shortcut(c) {
                return Ok(view);
            }
        }
        self.by_name(query)
            .or_else(|| {
                let label = query.replace(['-', '_'], " ");
                self.by_name(&label)
            })
            .ok_or_else(|| Error::UnknownView(query.to_string()))
    }

    /// Candidate viewers for a lowercased `type/subtype`, first match first
    pub fn candidates_for_type(&self, content_type: &str) -> &[View] {
        self.by_type.get(content_type).map_or(&[], Vec::as_slice)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Capabilities::detect())
    }
}

/// The process-wide registry
pub fn global() -> Arc<Registry> {
    Arc::clone(&GLOBAL)
}
