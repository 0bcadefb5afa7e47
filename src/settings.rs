//! User-tunable limits, read from `<config dir>/autodash/settings.json`.
//!
//! Every field has a default; a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sampling parameters for schema inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// Rows examined per column, counted from the top of the file.
    pub sample_size: usize,
    /// Share of sampled values that must agree before a column is typed
    /// `date` or `number`. Compared with a strict `>`.
    pub threshold: f64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            sample_size: 100,
            threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Category columns with more distinct values get no filter control.
    pub max_category_values: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            max_category_values: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub max_charts: usize,
    pub top_categories: usize,
    pub max_numeric_points: usize,
    pub max_date_points: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            max_charts: 8,
            top_categories: 10,
            max_numeric_points: 50,
            max_date_points: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inference: InferenceSettings,
    pub filters: FilterSettings,
    pub charts: ChartSettings,
}

impl Settings {
    /// Default location of the settings file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("autodash").join("settings.json"))
    }

    /// Read settings from `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load from the default location, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "inference": { "threshold": 0.5 } }"#).unwrap();
        assert_eq!(settings.inference.threshold, 0.5);
        assert_eq!(settings.inference.sample_size, 100);
        assert_eq!(settings.filters, FilterSettings::default());
        assert_eq!(settings.charts.max_charts, 8);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }
}
