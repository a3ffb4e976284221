// Settings management and persistence
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{PlaybackError, Result};
use crate::playback::engine::{PlaybackMode, PlaybackRequest};

/// Output device settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Substring of the preferred output device name, e.g. "MIXLINE"
    pub device_name: Option<String>,
}

/// Defaults applied to each play call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackDefaults {
    pub wait_for_completion: bool,
    pub delete_after_playback: bool,
    pub mode: PlaybackMode,
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            wait_for_completion: true,
            delete_after_playback: false,
            mode: PlaybackMode::Stream,
        }
    }
}

impl PlaybackDefaults {
    pub fn request(&self, path: impl Into<PathBuf>) -> PlaybackRequest {
        PlaybackRequest::new(path)
            .wait(self.wait_for_completion)
            .delete(self.delete_after_playback)
            .mode(self.mode)
    }
}

/// Main player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub version: i32, // Settings schema version for future migrations
    pub output: OutputSettings,
    pub playback: PlaybackDefaults,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: 1,
            output: OutputSettings::default(),
            playback: PlaybackDefaults::default(),
        }
    }
}

impl PlayerSettings {
    pub fn get_settings_path(settings_dir: &Path) -> PathBuf {
        settings_dir.join("settings.json")
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(settings_dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(settings_dir);

        if !path.exists() {
            debug!(?path, "No settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let settings: PlayerSettings = serde_json::from_str(&content)
            .map_err(|e| PlaybackError::Settings(format!("Failed to parse settings: {}", e)))?;

        info!(?path, "Loaded settings");
        Ok(settings)
    }

    pub fn save(&self, settings_dir: &Path) -> Result<()> {
        fs::create_dir_all(settings_dir)?;

        let path = Self::get_settings_path(settings_dir);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PlaybackError::Settings(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&path, content)?;

        info!(?path, "Saved settings");
        Ok(())
    }
}
