//! API key CLI commands.

use std::io::{self, BufRead};

use clap::Subcommand;
use colored::Colorize;

use crate::error::AiwallError;
use crate::logging::Redacted;
use crate::secret::SecretStore;

/// API key management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum KeyCommands {
    /// Encrypt and save the image API key.
    ///
    /// Reads the key from standard input when no argument is given, which
    /// keeps it out of shell history.
    #[command(after_long_help = r#"Examples:
  aiwall key set sk-...                 # Save the key given as an argument
  echo "$OPENAI_API_KEY" | aiwall key set   # Read the key from stdin"#)]
    Set {
        /// The API key.
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },

    /// Show whether a key is saved, masked.
    Status,

    /// Delete the saved key.
    Clear,
}

/// Execute key subcommands.
///
/// # Errors
///
/// Returns an error if the key cannot be read, saved, decrypted, or removed.
pub fn execute(cmd: &KeyCommands, secrets: &SecretStore) -> Result<(), AiwallError> {
    match cmd {
        KeyCommands::Set { key } => {
            let key = match key {
                Some(key) => key.clone(),
                None => read_key_from(io::stdin().lock())?,
            };
            secrets.save_credential(normalize_key(&key)?)?;
            println!("{}", "API key saved successfully!".green());
            Ok(())
        }
        KeyCommands::Status => {
            println!("{}", status_line(secrets)?);
            Ok(())
        }
        KeyCommands::Clear => {
            if secrets.clear_credential()? {
                println!("API key removed.");
            } else {
                println!("{}", "No API key was saved.".dimmed());
            }
            Ok(())
        }
    }
}

fn read_key_from(mut reader: impl BufRead) -> Result<String, AiwallError> {
    let mut line = String::new();
    reader.read_line(&mut line).map_err(|err| AiwallError::io("stdin", &err))?;
    Ok(line)
}

/// Trims pasted whitespace; an empty key is rejected.
fn normalize_key(key: &str) -> Result<&str, AiwallError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AiwallError::InvalidArguments("Please enter an API key".to_string()));
    }
    Ok(key)
}

fn status_line(secrets: &SecretStore) -> Result<String, AiwallError> {
    Ok(match secrets.load_credential()? {
        Some(key) => format!("API key: {} ({})", "saved".green(), Redacted(&key)),
        None => format!("API key: {}. Run 'aiwall key set' to add one.", "not set".yellow()),
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;
    use crate::paths::AppPaths;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: KeyCommands,
    }

    #[test]
    fn test_key_set_parse() {
        let cli = TestCli::try_parse_from(["test", "set", "sk-abc"]).unwrap();
        match cli.command {
            KeyCommands::Set { key } => assert_eq!(key.as_deref(), Some("sk-abc")),
            _ => panic!("Expected Set command"),
        }

        let cli = TestCli::try_parse_from(["test", "set"]).unwrap();
        assert!(matches!(cli.command, KeyCommands::Set { key: None }));
    }

    #[test]
    fn test_read_key_from_stdin_line() {
        let key = read_key_from(io::Cursor::new("sk-from-stdin\nignored\n")).unwrap();
        assert_eq!(normalize_key(&key).unwrap(), "sk-from-stdin");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  sk-padded  \n").unwrap(), "sk-padded");
        assert!(matches!(normalize_key(" \t\n"), Err(AiwallError::InvalidArguments(_))));
    }

    #[test]
    fn test_set_stores_trimmed_key() {
        let tmp = TempDir::new().unwrap();
        let secrets = SecretStore::from_paths(&AppPaths::rooted_at(tmp.path()));

        execute(&KeyCommands::Set { key: Some("  sk-pasted-key \n".to_string()) }, &secrets).unwrap();
        assert_eq!(secrets.load_credential().unwrap().unwrap().as_str(), "sk-pasted-key");

        let err = execute(&KeyCommands::Set { key: Some("   ".to_string()) }, &secrets).unwrap_err();
        assert!(matches!(err, AiwallError::InvalidArguments(_)));
    }

    #[test]
    fn test_status_masks_saved_key() {
        let tmp = TempDir::new().unwrap();
        let secrets = SecretStore::from_paths(&AppPaths::rooted_at(tmp.path()));

        assert!(status_line(&secrets).unwrap().contains("not set"));

        secrets.save_credential("sk-abcdefghijklmnopqrstuvwxyz").unwrap();
        let line = status_line(&secrets).unwrap();
        assert!(line.contains("sk-a...wxyz"));
        assert!(!line.contains("abcdefghijklmnop"));
    }

    #[test]
    fn test_set_and_clear() {
        let tmp = TempDir::new().unwrap();
        let secrets = SecretStore::from_paths(&AppPaths::rooted_at(tmp.path()));

        execute(&KeyCommands::Set { key: Some("sk-test".to_string()) }, &secrets).unwrap();
        assert!(secrets.has_credential());

        execute(&KeyCommands::Clear, &secrets).unwrap();
        assert!(!secrets.has_credential());
    }
}
