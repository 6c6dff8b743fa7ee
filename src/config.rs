/// Application settings
///
/// A small JSON file in the user's config directory:
/// - Linux: ~/.config/aura/settings.json
/// - macOS: ~/Library/Application Support/aura/settings.json
/// - Windows: %APPDATA%\aura\settings.json
///
/// Missing or unreadable settings fall back to defaults; the file is
/// written back so users find something to edit.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::collection::DEFAULT_PAGE_SIZE;
use crate::state::viewer::DEFAULT_SLIDESHOW_SECS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the gallery server
    pub server_url: String,
    /// Records per page request
    pub page_size: usize,
    /// Seconds between slideshow advances
    pub slideshow_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: "http://127.0.0.1:8000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            slideshow_secs: DEFAULT_SLIDESHOW_SECS,
        }
    }
}

impl Config {
    /// Get the path where the settings file should be stored
    fn get_config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("aura");
        path.push("settings.json");
        Some(path)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load_or_default() -> Config {
        let Some(path) = Self::get_config_path() else {
            eprintln!("⚠️  Could not determine config directory, using defaults");
            return Config::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("⚠️  Invalid settings file ({}), using defaults", e);
                    Config::default()
                }
            },
            Err(_) => {
                // First run: write the defaults so there is a file to edit
                let config = Config::default();
                if let Err(e) = config.save() {
                    eprintln!("⚠️  Could not write default settings: {}", e);
                } else {
                    println!("📁 Settings initialized at: {}", path.display());
                }
                config
            }
        }
    }

    /// Persist the settings file
    pub fn save(&self) -> Result<(), String> {
        let path = Self::get_config_path()
            .ok_or_else(|| "could not determine config directory".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create config directory: {}", e))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize settings: {}", e))?;

        std::fs::write(&path, contents).map_err(|e| format!("failed to write settings: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8000");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.slideshow_secs, DEFAULT_SLIDESHOW_SECS);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        // A hand-edited file usually only overrides the server URL
        let config: Config =
            serde_json::from_str(r#"{"server_url": "http://nas.local:9000"}"#).unwrap();
        assert_eq!(config.server_url, "http://nas.local:9000");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_roundtrip() {
        let config = Config {
            server_url: "http://example.org".to_string(),
            page_size: 25,
            slideshow_secs: 7,
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.page_size, 25);
        assert_eq!(restored.slideshow_secs, 7);
    }
}
