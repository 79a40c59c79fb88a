//! Error types for cview-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.
//!
//! Note that a viewer *declining* content is not an error: viewers return
//! `Ok(None)` for that. The variants here describe genuine faults.

use thiserror::Error;

/// Main error type for cview-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A viewer hit an internal fault while rendering
    #[error("View '{view}' failed: {message}")]
    View {
        /// Name of the viewer that failed
        view: &'static str,
        /// Error message
        message: String,
    },

    /// A viewer panicked and the panic was caught at the isolation boundary
    #[error("View '{view}' panicked: {message}")]
    ViewPanic {
        /// Name of the viewer that panicked
        view: &'static str,
        /// Panic payload, if it was a string
        message: String,
    },

    /// Content-encoding decoding failed
    #[error("Failed to decode '{encoding}' content: {reason}")]
    Decode {
        /// The declared content encoding
        encoding: String,
        /// Failure reason
        reason: String,
    },

    /// AMF remoting envelope is malformed
    #[error("AMF decoding error at offset {offset}: {message}")]
    AmfDecode {
        /// Detailed error message
        message: String,
        /// Offset in the envelope where the error occurred
        offset: usize,
    },

    /// No viewer with the given name or shortcut
    #[error("Unknown view: {0}")]
    UnknownView(String),

    /// Two viewers share a name or shortcut
    #[error("Duplicate view {what} '{value}'")]
    DuplicateView {
        /// "name" or "shortcut"
        what: &'static str,
        /// The clashing value
        value: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a view fault error
    pub fn view(view: &'static str, message: impl Into<String>) -> Self {
        Self::View {
            view,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(encoding: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            encoding: encoding.into(),
            reason: reason.into(),
        }
    }

    /// Create an AMF decode error at the given offset
    pub fn amf_at(message: impl Into<String>, offset: usize) -> Self {
        Self::AmfDecode {
            message: message.into(),
            offset,
        }
    }

    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
