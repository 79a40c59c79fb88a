//! Configuration management for cview
//!
//! Provides a strongly-typed configuration system with TOML support. Every
//! section has defaults, so an empty file is a valid configuration.

use crate::error::{Error, Result};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default output limit in bytes
pub const DEFAULT_LIMIT: usize = 50 * 1024;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewer selection and output limit
    pub view: ViewConfig,

    /// Content decoding limits
    pub decode: DecodeConfig,

    /// Text layout of rendered output
    pub layout: LayoutConfig,

    /// Optional viewers
    pub features: FeaturesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.view.limit == 0 {
            return Err(Error::config_value("view.limit", "Must be greater than 0"));
        }
        if Registry::default().lookup(&self.view.default_view).is_err() {
            return Err(Error::config_value(
                "view.default_view",
                format!("Unknown view '{}'", self.view.default_view),
            ));
        }

        if self.decode.max_decoded_size == 0 {
            return Err(Error::config_value(
                "decode.max_decoded_size",
                "Must be greater than 0",
            ));
        }

        if self.layout.key_max_width == 0 {
            return Err(Error::config_value("layout.key_max_width", "Must be greater than 0"));
        }
        if self.layout.json_indent == 0 {
            return Err(Error::config_value("layout.json_indent", "Must be greater than 0"));
        }
        if self.layout.js_indent == 0 {
            return Err(Error::config_value("layout.js_indent", "Must be greater than 0"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_value(
                "logging.level",
                format!("Must be one of: {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Options handed to viewers
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            limit: self.view.limit,
            key_max_width: self.layout.key_max_width,
            json_indent: self.layout.json_indent,
            js_indent: self.layout.js_indent,
            max_decoded_size: self.decode.max_decoded_size,
            image_alloc_floor: self.decode.image_alloc_floor,
        }
    }
}

/// Viewer selection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Viewer used when none is requested (name or shortcut)
    pub default_view: String,

    /// Bytes of rendered output before the "not shown" notice
    pub limit: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_view: "auto".to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Content decoding limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Largest decompressed body accepted; larger ones stay encoded
    pub max_decoded_size: u64,

    /// Minimum allocation allowance for image header decoding
    pub image_alloc_floor: u64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_decoded_size: 64 * 1024 * 1024,
            image_alloc_floor: 1024 * 1024,
        }
    }
}

/// Text layout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Widest key column in key/value tables
    pub key_max_width: usize,

    /// JSON indentation width
    pub json_indent: usize,

    /// JavaScript indentation width
    pub js_indent: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            key_max_width: 30,
            json_indent: 4,
            js_indent: 2,
        }
    }
}

/// Optional viewer switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Register the AMF viewer (when compiled in)
    pub amf: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { amf: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path
    pub file: Option<String>,

    /// Use JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json_format: false,
        }
    }
}

/// Tuning knobs read by viewers during a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Output limit in bytes
    pub limit: usize,
    /// Widest key column in key/value tables
    pub key_max_width: usize,
    /// JSON indentation width
    pub json_indent: usize,
    /// JavaScript indentation width
    pub js_indent: usize,
    /// Cap on decompressed body size
    pub max_decoded_size: u64,
    /// Minimum allocation allowance for image header decoding
    pub image_alloc_floor: u64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Config::default().view_options()
    }
}
