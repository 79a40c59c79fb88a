//! Views command - list registered viewers

use anyhow::{Context, Result};
use colored::Colorize;
use cview_core::{Config, ContentView, Viewer};

/// Execute views command
pub fn execute(config: &Config) -> Result<()> {
    let viewer = ContentView::new(config).context("Invalid configuration")?;
    let default = viewer.default_view();

    println!("Available viewers:");
    println!();
    for view in viewer.registry().views() {
        let marker = if *view == default { "*" } else { " " };
        println!(
            "  {} {}  {:<16} {}",
            marker,
            view.shortcut().to_string().cyan().bold(),
            view.name(),
            view.content_types().join(", ").dimmed()
        );
    }
    println!();
    println!("  * default viewer");
    Ok(())
}
