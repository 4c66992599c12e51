//! Engine settings loaded from a JSON file.
//!
//! Every field has a default, so a partial file is valid. A missing or
//! malformed file is not fatal: [`load_or_default`] logs and falls back.

use crate::constants::{
    DEFAULT_ARCHIVE_EXTENSION, DEFAULT_DELIMITER, DEFAULT_ROWS_PER_PAGE, MAX_CSV_ROWS,
    SLOW_STAGE_MS,
};
use crate::data::chart_engine::Theme;
use crate::data::csv_parser::{InferenceMode, ParseOptions};
use crate::data::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub delimiter: char,
    pub rows_per_page: usize,
    pub inference: InferenceMode,
    /// Extension of the entry to pick out of an archive
    pub archive_extension: String,
    /// Theme name, see [`Theme::names`]
    pub theme: String,
    pub slow_stage_ms: f64,
    pub max_rows: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            inference: InferenceMode::default(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            theme: "classic".to_string(),
            slow_stage_ms: SLOW_STAGE_MS,
            max_rows: MAX_CSV_ROWS,
        }
    }
}

impl EngineSettings {
    /// Ingestion options derived from these settings
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: self.delimiter,
            inference: self.inference,
            max_rows: self.max_rows,
            archive_extension: self.archive_extension.clone(),
        }
    }

    /// The configured theme, or the default for an unknown name
    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, "Unknown theme, using default");
            Theme::default()
        })
    }

    pub fn save(&self, path: &Path) -> DataResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Settings file location under the user's config directory
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("csvscope").join("settings.json"))
}

/// Read settings from a JSON file
pub fn load(path: &Path) -> DataResult<EngineSettings> {
    let content = std::fs::read_to_string(path)?;
    let settings: EngineSettings = serde_json::from_str(&content)?;
    if settings.delimiter == '"' || settings.delimiter == '\n' || settings.delimiter == '\r' {
        return Err(DataError::Other(format!(
            "Invalid delimiter {:?}",
            settings.delimiter
        )));
    }
    Ok(settings)
}

/// Read settings, falling back to defaults when the file is absent or bad
pub fn load_or_default(path: Option<&Path>) -> EngineSettings {
    let Some(path) = path else {
        return EngineSettings::default();
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return EngineSettings::default();
    }
    match load(path) {
        Ok(settings) => {
            tracing::debug!(path = %path.display(), "Loaded settings");
            settings
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load settings, using defaults");
            EngineSettings::default()
        }
    }
}
