//! Logging initialization
//!
//! Logs go to stderr so rendered output on stdout stays clean.

use anyhow::{Context, Result};
use cview_core::config::LoggingConfig;
use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Args, LogFormat};

fn config_level(config: Option<&LoggingConfig>) -> Level {
    config
        .and_then(|c| c.level.parse().ok())
        .unwrap_or(Level::WARN)
}

/// Initialize logging from CLI arguments, falling back to the config file
pub fn init(args: &Args, config: Option<&LoggingConfig>) -> Result<()> {
    // Determine log level
    let level = if args.quiet {
        Level::ERROR
    } else {
        match args.verbose {
            0 => config_level(config),
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    // Build env filter
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let log_file = args
        .log_file
        .clone()
        .or_else(|| config.and_then(|c| c.file.clone()));
    let file = match log_file {
        Some(ref path) => Some(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path))?,
        ),
        None => None,
    };

    let format = match args.log_format {
        LogFormat::Text if config.is_some_and(|c| c.json_format) => LogFormat::Json,
        other => other,
    };

    // Set up subscriber based on format
    match format {
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(args.verbose >= 2)
                    .with_thread_ids(args.verbose >= 3)
                    .with_file(args.verbose >= 3)
                    .with_line_number(args.verbose >= 3),
            );

            if let Some(file) = file {
                let file_layer = fmt::layer().with_ansi(false).with_writer(file);
                subscriber.with(file_layer).init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(io::stderr));

            if let Some(file) = file {
                let file_layer = fmt::layer().json().with_writer(file);
                subscriber.with(file_layer).init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(io::stderr));

            if let Some(file) = file {
                let file_layer = fmt::layer().compact().with_ansi(false).with_writer(file);
                subscriber.with(file_layer).init();
            } else {
                subscriber.init();
            }
        }
    }

    Ok(())
}
