//! Config CLI commands.
//!
//! Commands for managing the aiwall configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{LoadedConfig, config_paths, print_schema};
use crate::error::AiwallError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  aiwall config init              # Create config at default location
  aiwall config init --force      # Overwrite existing config
  aiwall config init --path ~/my-config.jsonc  # Create at custom path
  aiwall config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/aiwall/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the configuration search paths and which one is in use.
    Path,

    /// Print the effective configuration as JSON.
    Show,

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for editors that support JSON Schema
    /// validation.
    Schema,
}

/// Execute config subcommands.
///
/// `loaded` is only consulted by `show` and `path`.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands, loaded: &LoadedConfig) -> Result<(), AiwallError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_config_path(loaded.path.as_deref());
            Ok(())
        }
        ConfigCommands::Show => {
            match &loaded.path {
                Some(path) => eprintln!("{} {}", "Loaded from".dimmed(), path.display()),
                None => eprintln!("{}", "Using built-in defaults".dimmed()),
            }
            println!("{}", serde_json::to_string_pretty(&loaded.config)?);
            Ok(())
        }
        ConfigCommands::Schema => {
            println!("{}", print_schema());
            Ok(())
        }
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), AiwallError> {
    let config_path = custom_path.unwrap_or_else(|| {
        config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    if config_path.exists() && !force {
        return Err(AiwallError::Config(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        AiwallError::Config(format!("Failed to create config file {}: {e}", config_path.display()))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out and show their defaults.");
    Ok(())
}

/// Lists the search paths, marking the one in use.
fn show_config_path(active: Option<&Path>) {
    println!("Configuration file search paths (in priority order):\n");

    let paths = config_paths();
    for (i, path) in paths.iter().enumerate() {
        let marker = if Some(path.as_path()) == active {
            " (active)".green().to_string()
        } else if path.exists() {
            " (exists)".to_string()
        } else {
            String::new()
        };
        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    match active {
        Some(path) if !paths.iter().any(|p| p == path) => {
            println!("\nIn use (--config): {}", path.display());
        }
        Some(_) => {}
        None => {
            println!("\nNo configuration file found.");
            println!("Run 'aiwall config init' to create one.");
        }
    }
}
