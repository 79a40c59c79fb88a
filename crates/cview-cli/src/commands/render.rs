//! Render command - show a message body through a viewer

use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use cview_core::{Config, ContentView, Line, RenderOutcome, Span, StyleTag};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Render command arguments
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Body file, or `-` for stdin
    pub file: PathBuf,

    /// Message header, e.g. "Content-Type: application/json" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Viewer name or shortcut key (default: from config)
    #[arg(long, value_name = "VIEW")]
    pub view: Option<String>,

    /// Output limit in bytes
    #[arg(long, value_name = "BYTES", conflicts_with = "full")]
    pub limit: Option<usize>,

    /// Show everything regardless of size, after decoding
    #[arg(long)]
    pub full: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected \"Name: value\", got {raw:?}")),
    }
}

fn read_body(file: &Path) -> Result<Vec<u8>> {
    if file.as_os_str() == "-" {
        let mut body = Vec::new();
        io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read stdin")?;
        Ok(body)
    } else {
        std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))
    }
}

fn paint(span: &Span) -> ColoredString {
    let text = span.text.as_str();
    match span.style {
        StyleTag::Plain | StyleTag::Text => text.normal(),
        StyleTag::Highlight => text.yellow().bold(),
        StyleTag::Key => text.cyan().bold(),
        StyleTag::Offset => text.blue(),
        StyleTag::Header => text.green(),
    }
}

fn write_line(out: &mut impl Write, line: &Line) -> io::Result<()> {
    for span in &line.spans {
        write!(out, "{}", paint(span))?;
    }
    writeln!(out)
}

fn print_outcome(outcome: &RenderOutcome) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", outcome.status.bold())?;
    for line in &outcome.lines {
        write_line(&mut out, line)?;
    }
    out.flush()?;
    Ok(())
}

/// Execute render command
pub fn execute(args: RenderArgs, config: &Config) -> Result<()> {
    let viewer = ContentView::new(config).context("Invalid configuration")?;
    let body = read_body(&args.file)?;
    debug!(bytes = body.len(), headers = args.headers.len(), "Body loaded");

    // --full must also cover the body once Content-Encoding is undone
    let limit = if args.full { Some(usize::MAX) } else { args.limit };

    let outcome = viewer.render(
        args.view.as_deref(),
        args.headers,
        &body,
        limit,
        &mut |msg| eprintln!("{}", msg.red()),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome)?;
    }
    Ok(())
}
