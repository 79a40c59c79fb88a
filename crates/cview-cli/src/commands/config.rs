//! Config command - configuration management

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use cview_core::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const LOCAL_CONFIG: &str = "cview.toml";

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Config file to show (default: detect)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file with every default spelled out
    Generate {
        /// Output file path
        #[arg(short, long, default_value = LOCAL_CONFIG)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs, effective: Result<Config>) -> Result<()> {
    match args.action {
        ConfigAction::Show { file } => show_config(file, effective),
        ConfigAction::Generate { output, force } => generate_config(&output, force),
        ConfigAction::Validate { file } => validate_config(&file),
        ConfigAction::Paths => show_paths(),
    }
}

/// Load the configuration the other commands run with
///
/// An explicit path must exist. Otherwise the search paths are tried in
/// order and defaults are used when none is found.
pub fn resolve(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };
    match path {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            Config::load(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => Ok(Config::default()),
    }
}

fn show_config(file: Option<PathBuf>, effective: Result<Config>) -> Result<()> {
    let config = match file {
        Some(path) => {
            Config::load(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => effective?,
    };

    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let toml_str = Config::default()
        .to_toml()
        .context("Failed to serialize config")?;

    let content = format!(
        "# cview configuration\n\
         # Every key is optional; missing keys take the values below.\n\n\
         {}",
        toml_str
    );

    std::fs::write(output, content)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    info!("Generated config file: {:?}", output);
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: &Path) -> Result<()> {
    let config =
        Config::load(file).with_context(|| format!("Failed to load config from {:?}", file))?;

    config.validate().context("Configuration validation failed")?;

    println!("{} Configuration is valid", "✓".green());
    println!("  Default view: {}", config.view.default_view);
    println!("  Limit: {} bytes", config.view.limit);
    println!("  Max decoded size: {} bytes", config.decode.max_decoded_size);
    println!("  AMF: {}", config.features.amf);

    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();
    println!("  1. ./{}", LOCAL_CONFIG);
    if let Some(path) = user_config_path() {
        println!("  2. {}", path.display());
    }
    Ok(())
}

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cview").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn find_config_file() -> Option<PathBuf> {
    std::iter::once(PathBuf::from(LOCAL_CONFIG))
        .chain(user_config_path())
        .find(|path| path.exists())
}
