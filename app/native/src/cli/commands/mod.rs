//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file commands
//! - `generate` - One-shot generation and the `watch` auto-changer
//! - `key` - API key commands
//! - `library` - Saved wallpaper commands
//! - `types` - Shared types used across commands

use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell};
use colored::Colorize;

use super::output;
use crate::app::{AppContext, resolve_paths};
use crate::config::{self, LoadedConfig};
use crate::error::AiwallError;
use crate::generation::Interval;
use crate::generation::schedule::cost_label;
use crate::secret::SecretStore;

pub mod config_cmd;
pub mod generate;
pub mod key;
pub mod library;
pub mod types;

pub use config_cmd::ConfigCommands;
pub use generate::{GenerateArgs, WatchArgs};
pub use key::KeyCommands;
pub use library::LibraryCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// aiwall - AI generated 4K desktop wallpapers.
#[derive(Parser, Debug)]
#[command(name = "aiwall")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the key, credential, lock, and current wallpaper files.
    #[arg(long, global = true, value_name = "DIR", env = "AIWALL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log debug details to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Generate a new wallpaper and set it as the desktop background.
    #[command(after_long_help = r#"Examples:
  aiwall generate                                # Configured prompt (Random by default)
  aiwall generate --preset "Beach Vistas"        # A specific preset
  aiwall generate --prompt "A red apple on a table" --no-save"#)]
    Generate(GenerateArgs),

    /// Change the wallpaper automatically at a fixed interval.
    ///
    /// Runs in the foreground until stopped.
    Watch(WatchArgs),

    /// List the prompt presets.
    Presets,

    /// API key management commands.
    #[command(subcommand)]
    Key(KeyCommands),

    /// Saved wallpaper commands.
    #[command(subcommand)]
    Library(LibraryCommands),

    /// Estimate the monthly cost of an auto-change interval.
    Cost {
        /// Interval to estimate. Defaults to `schedule.interval`.
        #[arg(value_name = "INTERVAL")]
        interval: Option<Interval>,

        /// Show every offered interval.
        #[arg(long, conflicts_with = "interval")]
        all: bool,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(aiwall completions --shell zsh)"
    ///   aiwall completions --shell fish > ~/.config/fish/completions/aiwall.fish
    #[command(verbatim_doc_comment)]
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> { self.config.as_deref() }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), AiwallError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(AiwallError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        match &self.command {
            Commands::Generate(args) => generate::generate(&self.context()?, args),
            Commands::Watch(args) => generate::watch(&self.context()?, args),
            Commands::Library(cmd) => library::execute(cmd, &self.context()?),

            Commands::Key(cmd) => {
                let loaded = self.load_config();
                let paths = resolve_paths(&loaded.config, self.data_dir.as_deref());
                key::execute(cmd, &SecretStore::from_paths(&paths))
            }

            Commands::Presets => {
                println!("{}", output::presets_table());
                println!("Use \"Random\" to pick a different preset each time.");
                Ok(())
            }

            Commands::Cost { interval, all } => {
                let loaded = self.load_config();
                let price = loaded.config.schedule.price_per_image;
                if *all {
                    println!("{}", output::cost_table(price));
                    return Ok(());
                }

                let interval = match interval {
                    Some(interval) => *interval,
                    None => loaded.config.schedule.interval.parse()?,
                };
                println!("{}: {}", interval.to_string().bold(), cost_label(interval, price));
                Ok(())
            }

            Commands::Config(cmd) => config_cmd::execute(cmd, &self.load_config()),

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    fn load_config(&self) -> LoadedConfig { config::load(self.config_path()) }

    /// Builds the full application context for pipeline and library commands.
    fn context(&self) -> Result<AppContext, AiwallError> {
        let loaded = self.load_config();
        let paths = resolve_paths(&loaded.config, self.data_dir.as_deref());
        AppContext::new(loaded, paths)
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        clap_complete::generate(generator, &mut cmd, "aiwall", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_generate_defaults() {
        let cli = Cli::try_parse_from(["aiwall", "generate"]).unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.prompt.prompt.is_none());
                assert!(args.prompt.preset.is_none());
                assert!(!args.prompt.no_save);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parses_generate_prompt() {
        let cli = Cli::try_parse_from(["aiwall", "generate", "-p", "A red apple on a table", "--no-save"])
            .unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.prompt.prompt.as_deref(), Some("A red apple on a table"));
                assert!(args.prompt.no_save);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_rejects_save_and_no_save() {
        assert!(Cli::try_parse_from(["aiwall", "generate", "--save", "--no-save"]).is_err());
    }

    #[test]
    fn test_cli_parses_presets() {
        let cli = Cli::try_parse_from(["aiwall", "presets"]).unwrap();
        assert!(matches!(cli.command, Commands::Presets));
    }

    #[test]
    fn test_cli_parses_key_status() {
        let cli = Cli::try_parse_from(["aiwall", "key", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Key(KeyCommands::Status)));
    }

    #[test]
    fn test_cli_parses_library_reveal() {
        let cli = Cli::try_parse_from(["aiwall", "library", "reveal", "3"]).unwrap();
        match cli.command {
            Commands::Library(LibraryCommands::Reveal { index }) => assert_eq!(index.as_zero_based(), 2),
            _ => panic!("Expected Library Reveal command"),
        }
    }

    #[test]
    fn test_cli_parses_cost() {
        let cli = Cli::try_parse_from(["aiwall", "cost", "6 hours"]).unwrap();
        match cli.command {
            Commands::Cost { interval, all } => {
                assert_eq!(interval, Some(Interval::Minutes(360)));
                assert!(!all);
            }
            _ => panic!("Expected Cost command"),
        }

        let cli = Cli::try_parse_from(["aiwall", "cost", "--all"]).unwrap();
        assert!(matches!(cli.command, Commands::Cost { interval: None, all: true }));
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["aiwall", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_config_schema() {
        let cli = Cli::try_parse_from(["aiwall", "config", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Schema)));
    }

    // ========================================================================
    // Global flags
    // ========================================================================

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "aiwall",
            "library",
            "list",
            "--config",
            "/path/to/config.jsonc",
            "--data-dir",
            "/srv/aiwall",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config_path(), Some(Path::new("/path/to/config.jsonc")));
        assert_eq!(cli.data_dir.as_deref(), Some(Path::new("/srv/aiwall")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_config_path_returns_none_when_not_specified() {
        let cli = Cli::try_parse_from(["aiwall", "presets"]).unwrap();
        assert!(cli.config_path().is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let cli = Cli::try_parse_from(["aiwall", "--config", "/definitely/missing.jsonc", "presets"]).unwrap();
        let err = cli.execute().unwrap_err();
        assert!(matches!(err, AiwallError::Config(_)));
    }

    #[test]
    fn test_app_version_is_not_empty() {
        assert!(!APP_VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
