//! Settings persistence
//!
//! Stores user preferences in ~/.config/tunegrab/settings.json. The download
//! directory is never guessed: it must be set here or passed per invocation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;
use crate::media::AudioFormat;

/// Template used when none is configured
pub const DEFAULT_SEARCH_TEMPLATE: &str = "ARTIST - NAME";

/// Persistent user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where audio files (and the Artwork cache) are written
    pub download_dir: Option<PathBuf>,
    /// Search query with NAME, ARTIST and ALBUM placeholders
    pub search_template: String,
    /// Target audio format
    pub format: AudioFormat,
    /// Embed album artwork into downloaded files
    pub embed_artwork: bool,
    /// yt-dlp executable
    pub ytdlp_path: String,
    /// ffmpeg executable
    pub ffmpeg_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_dir: None,
            search_template: DEFAULT_SEARCH_TEMPLATE.to_string(),
            format: AudioFormat::default(),
            embed_artwork: true,
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the user config directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save settings to the user config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Load settings from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&contents)?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Get the settings file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tunegrab").join("settings.json"))
    }

    /// The configured download directory, or an error if there is none
    pub fn require_download_dir(&self) -> Result<&Path, ConfigError> {
        self.download_dir
            .as_deref()
            .ok_or(ConfigError::MissingDownloadDir)
    }
}
