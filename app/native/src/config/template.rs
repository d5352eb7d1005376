//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// aiwall configuration file
// ==========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Image Generation API
  // ============================================================================
  // "api": {
  //   // Endpoint that accepts {prompt, n, size, response_format, quality}
  //   "endpoint": "https://api.openai.com/v1/images/generations",
  //
  //   // Optional model name sent with each request
  //   // "model": "dall-e-3",
  //
  //   // Size of the generated source image
  //   "size": "1024x1024",
  //
  //   // "hd" or "standard"
  //   "quality": "hd",
  //
  //   // Timeout in seconds for each HTTP request
  //   "timeoutSecs": 120
  // },

  // ============================================================================
  // Wallpaper Library
  // ============================================================================
  // "library": {
  //   // Directory for saved wallpapers (empty = platform data directory)
  //   "path": "",
  //
  //   // Save every generated wallpaper unless --no-save is passed
  //   "saveByDefault": true
  // },

  // ============================================================================
  // Prompts
  // ============================================================================
  // "prompts": {
  //   // Preset name (see `aiwall presets`), or "Random"
  //   "preset": "Random",
  //
  //   // Custom prompt; takes precedence over the preset when not empty
  //   "custom": ""
  // },

  // ============================================================================
  // Auto-change Schedule
  // ============================================================================
  // "schedule": {
  //   // "never", "5 minutes", "15 minutes", "30 minutes", "45 minutes",
  //   // "60 minutes", "1 hour", "2 hours", "3 hours", "6 hours", "12 hours",
  //   // "24 hours"
  //   "interval": "never",
  //
  //   // Price of one generated image in USD, used by `aiwall cost`
  //   "pricePerImage": 0.040
  // }
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiwallConfig, load_config_from_path};

    #[test]
    fn test_template_parses_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/config.jsonc");

        create_config_file(&path).unwrap();
        let (config, _) = load_config_from_path(&path).unwrap();
        assert_eq!(config, AiwallConfig::default());
    }

    #[test]
    fn test_template_contains_all_sections() {
        let template = generate_config_template();
        for section in ["\"api\"", "\"library\"", "\"prompts\"", "\"schedule\""] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
