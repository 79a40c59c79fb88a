//! CLI commands

pub mod completions;
pub mod config;
pub mod render;
pub mod views;

use clap::Subcommand;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a message body
    Render(render::RenderArgs),

    /// List available viewers
    Views,

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
