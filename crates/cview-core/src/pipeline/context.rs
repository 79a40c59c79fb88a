//! Rendering context
//!
//! Shared, read-only state handed to every viewer call.

use crate::config::ViewOptions;
use crate::registry::{self, Registry};
use std::sync::Arc;

/// Execution context for viewers
///
/// Carries the registry (Auto dispatches through it) and the tuning
/// options derived from configuration. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Context {
    registry: Arc<Registry>,
    options: ViewOptions,
}

impl Context {
    /// Create a context over `registry` with `options`
    pub fn new(registry: Arc<Registry>, options: ViewOptions) -> Self {
        Self { registry, options }
    }

    /// Create a context over the global registry
    pub fn with_options(options: ViewOptions) -> Self {
        Self::new(registry::global(), options)
    }

    /// Registry used for viewer lookup
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Viewer tuning options
    pub fn options(&self) -> &ViewOptions {
        &self.options
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::with_options(ViewOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = Context::default();
        assert_eq!(ctx.options().limit, 51_200);
        assert!(!ctx.registry().views().is_empty());
    }

    #[test]
    fn test_custom_options() {
        let options = ViewOptions {
            json_indent: 2,
            ..ViewOptions::default()
        };
        let ctx = Context::with_options(options);
        assert_eq!(ctx.options().json_indent, 2);
    }
}
