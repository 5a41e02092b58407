//! Application Configuration
//! Defaults plus an optional JSON override file named by `CSV_VISUALIZER_CONFIG`.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable pointing at a JSON config file.
pub const CONFIG_ENV_VAR: &str = "CSV_VISUALIZER_CONFIG";

/// Largest PNG side in pixels.
pub const MAX_PNG_SIDE: u32 = 8000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the viewer. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Rows shown in each table preview (the data itself is never truncated).
    pub preview_rows: usize,
    pub png_width: u32,
    pub png_height: u32,
    /// Rows scanned for type inference; `None` scans the whole file.
    pub infer_schema_rows: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: 1400.0,
            window_height: 850.0,
            preview_rows: 200,
            png_width: 1000,
            png_height: 700,
            infer_schema_rows: None,
        }
    }
}

impl AppConfig {
    /// Load from `CSV_VISUALIZER_CONFIG` if set, otherwise defaults.
    /// A broken file is logged and ignored.
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };

        match Self::from_file(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, path);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = serde_json::from_str(text)?;
        config.preview_rows = config.preview_rows.max(1);
        config.png_width = config.png_width.clamp(200, MAX_PNG_SIDE);
        config.png_height = config.png_height.clamp(150, MAX_PNG_SIDE);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "preview_rows": 50 }"#).unwrap();
        assert_eq!(config.preview_rows, 50);
        assert_eq!(config.png_width, AppConfig::default().png_width);
        assert_eq!(config.infer_schema_rows, None);
    }

    #[test]
    fn tiny_sizes_are_raised() {
        let config =
            AppConfig::from_json(r#"{ "preview_rows": 0, "png_width": 10, "png_height": 10 }"#)
                .unwrap();
        assert_eq!(config.preview_rows, 1);
        assert_eq!(config.png_width, 200);
        assert_eq!(config.png_height, 150);
    }

    #[test]
    fn huge_sizes_are_capped() {
        let config = AppConfig::from_json(r#"{ "png_width": 4294967295, "png_height": 100000 }"#)
            .unwrap();
        assert_eq!(config.png_width, MAX_PNG_SIDE);
        assert_eq!(config.png_height, MAX_PNG_SIDE);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            AppConfig::from_json("{ preview_rows: "),
            Err(ConfigError::Parse(_))
        ));
    }
}
