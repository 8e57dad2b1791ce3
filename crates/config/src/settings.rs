// Application settings
// Loaded from ~/.config/gridmark/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid
    #[serde(rename = "grid.newRows")]
    pub new_rows: usize,

    #[serde(rename = "grid.newCols")]
    pub new_cols: usize,

    #[serde(rename = "grid.defaultColumnWidth")]
    pub default_column_width: f32,

    // Export
    #[serde(rename = "export.filename")]
    pub export_filename: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Grid
            new_rows: 20,
            new_cols: 10,
            default_column_width: 128.0,
            // Export
            export_filename: "table.md".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridmark");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) => {
                eprintln!("Error reading settings.json: {}", e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, tolerating // comment lines
    pub fn parse(contents: &str) -> Self {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        match serde_json::from_str(&cleaned) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error parsing settings.json: {}", e);
                eprintln!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(&path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // New-grid dimensions
    "grid.newRows": 20,
    "grid.newCols": 10,

    // Advisory column width in pixels (minimum 48)
    "grid.defaultColumnWidth": 128,

    // Default filename for markdown export
    "export.filename": "table.md"
}
"#;

        if let Err(e) = fs::write(&path, default_config) {
            eprintln!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
