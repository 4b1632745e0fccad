//! Import configuration.
//!
//! Everything here has a default, so an empty YAML document (or no config
//! file at all) gives the standard import:
//!
//! ```yaml
//! landscape: true
//! textSize: 15
//! titleSize: 20
//! useTextTags: true
//! placeholders:
//!   name: "[Imported from BWW]"
//!   tuneType: Tune Type
//!   composer: Composer
//! settings:
//!   bpm: 80
//!   instrument: ghb
//! ```

use crate::error::ImportError;
use crate::model::Settings;
use serde::Deserialize;
use std::path::Path;

/// Texts used for tune headings that the file does not provide.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Placeholders {
    pub name: String,
    pub tune_type: String,
    pub composer: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            name: "[Imported from BWW]".to_string(),
            tune_type: "Tune Type".to_string(),
            composer: "Composer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportConfig {
    pub settings: Settings,
    pub placeholders: Placeholders,
    pub landscape: bool,
    pub text_size: f64,
    pub title_size: f64,
    /// Fill the tune name, type and composer from typed text tags.
    pub use_text_tags: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            placeholders: Placeholders::default(),
            landscape: true,
            text_size: 15.0,
            title_size: 20.0,
            use_text_tags: true,
        }
    }
}

impl ImportConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ImportError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ImportError::ConfigError(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ImportConfig::from_yaml("").unwrap(), ImportConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ImportConfig::from_yaml(
            "landscape: false\nsettings:\n  bpm: 96\nplaceholders:\n  composer: Trad.\n",
        )
        .unwrap();
        assert!(!config.landscape);
        assert_eq!(config.settings.bpm, 96);
        assert_eq!(config.settings.instrument, "ghb");
        assert_eq!(config.placeholders.composer, "Trad.");
        assert_eq!(config.placeholders.name, "[Imported from BWW]");
        assert_eq!(config.text_size, 15.0);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let err = ImportConfig::from_yaml("landscape: [1, 2").unwrap_err();
        assert!(matches!(err, ImportError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ImportConfig::from_path("/nonexistent/bww-config.yaml").unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
