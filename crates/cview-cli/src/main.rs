//! cview CLI
//!
//! Command-line interface for inspecting captured HTTP message bodies.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing::error;

use args::Args;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // A broken config is reported by the command that needs it
    let config = commands::config::resolve(args.config.as_deref());

    // Initialize logging
    logging::init(&args, config.as_ref().ok().map(|c| &c.logging))?;

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let result = run(args, config);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args, config: Result<cview_core::Config>) -> Result<()> {
    match args.command {
        commands::Command::Render(render_args) => commands::render::execute(render_args, &config?),
        commands::Command::Views => commands::views::execute(&config?),
        commands::Command::Config(config_args) => commands::config::execute(config_args, config),
        commands::Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}
