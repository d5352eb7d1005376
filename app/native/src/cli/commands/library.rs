//! Library CLI commands.

use clap::Subcommand;
use colored::Colorize;

use super::types::LibraryIndex;
use crate::app::AppContext;
use crate::error::AiwallError;
use crate::instance::InstanceLock;
use crate::library::LibraryEntry;
use crate::paths::{dir_size, format_bytes};
use crate::platform::reveal_in_file_manager;

/// Library subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum LibraryCommands {
    /// List saved wallpapers, oldest first.
    List {
        /// Print the entries as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set a saved wallpaper as the desktop background.
    #[command(after_long_help = r#"Examples:
  aiwall library use 1     # First entry of `aiwall library list`"#)]
    Use {
        /// 1-based entry index from `aiwall library list`.
        #[arg(value_name = "INDEX")]
        index: LibraryIndex,
    },

    /// Show a saved wallpaper in the file manager.
    Reveal {
        /// 1-based entry index from `aiwall library list`.
        #[arg(value_name = "INDEX")]
        index: LibraryIndex,
    },

    /// Print the library directory and its size.
    Path,
}

/// Execute library subcommands.
///
/// # Errors
///
/// Returns an error if the record cannot be read, the index is out of
/// range, or the entry's file is missing.
pub fn execute(cmd: &LibraryCommands, ctx: &AppContext) -> Result<(), AiwallError> {
    match cmd {
        LibraryCommands::List { json } => {
            let entries = ctx.library.list()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{}", "No wallpapers in the library yet.".dimmed());
            } else {
                println!("{}", format!("Library ({})", entries.len()).bold());
                for line in list_lines(&entries) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        LibraryCommands::Use { index } => {
            let _lock = InstanceLock::acquire(&ctx.paths.data_dir)?;
            let entry = ctx.library.entry_at(index.as_zero_based())?;
            ctx.pipeline.apply_file(entry.require_file()?)?;
            println!("{} {}", "Wallpaper set from library entry".green(), index);
            Ok(())
        }
        LibraryCommands::Reveal { index } => {
            let entry = ctx.library.entry_at(index.as_zero_based())?;
            reveal_in_file_manager(entry.require_file()?)
        }
        LibraryCommands::Path => {
            let dir = ctx.library.dir();
            println!("{}", dir.display());
            if let Ok(size) = dir_size(dir) {
                eprintln!("{}", format!("{} on disk", format_bytes(size)).dimmed());
            }
            Ok(())
        }
    }
}

/// `  1. 20240101_120000 - A red apple on a table...` lines.
fn list_lines(entries: &[LibraryEntry]) -> Vec<String> {
    let width = entries.len().to_string().len();
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("  {:>width$}. {}", i + 1, entry.summary()))
        .collect()
}
