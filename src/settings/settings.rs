// Workflow settings and persistence
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WorkflowError;

/// Closed interval sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<(), WorkflowError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(WorkflowError::InvalidSettings(format!("{} must be finite", name)));
        }
        if self.min > self.max {
            return Err(WorkflowError::InvalidSettings(format!(
                "{}: min {} is greater than max {}",
                name, self.min, self.max
            )));
        }
        if !(self.max - self.min).is_finite() {
            return Err(WorkflowError::InvalidSettings(format!(
                "{}: span from {} to {} is too wide",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Main workflow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// SQLite file, relative paths resolve against the working directory
    pub database_path: PathBuf,
    /// Delete the database file before creating tables
    pub reset_database: bool,
    pub data_point_count: usize,
    pub real_value_range: ValueRange,
    pub target_multiplier_range: ValueRange,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("sql_app.db"),
            reset_database: false,
            data_point_count: 10,
            real_value_range: ValueRange::new(10.0, 50.0),
            target_multiplier_range: ValueRange::new(0.9, 1.1),
            seed: None,
        }
    }
}

impl WorkflowSettings {
    /// Get the settings file path
    pub fn get_settings_path(dir: &Path) -> PathBuf {
        dir.join("sql_app.json")
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(dir: &Path) -> Result<Self, WorkflowError> {
        let path = Self::get_settings_path(dir);

        if !path.exists() {
            tracing::info!("No settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(WorkflowError::SettingsRead)?;
        let settings: WorkflowSettings =
            serde_json::from_str(&content).map_err(WorkflowError::SettingsFormat)?;
        settings.validate()?;

        tracing::info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, dir: &Path) -> Result<(), WorkflowError> {
        // Ensure directory exists
        fs::create_dir_all(dir).map_err(WorkflowError::SettingsWrite)?;

        let path = Self::get_settings_path(dir);
        let content =
            serde_json::to_string_pretty(self).map_err(WorkflowError::SettingsEncode)?;
        fs::write(&path, content).map_err(WorkflowError::SettingsWrite)?;

        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.data_point_count == 0 {
            return Err(WorkflowError::InvalidSettings(
                "data_point_count must be at least 1".to_string(),
            ));
        }
        self.real_value_range.validate("real_value_range")?;
        self.target_multiplier_range.validate("target_multiplier_range")?;
        Ok(())
    }
}
