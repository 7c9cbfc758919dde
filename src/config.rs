// SPDX-License-Identifier: GPL-3.0-only

//! Persistent settings
//!
//! Stored as pretty JSON at `<config dir>/photobooth/config.json`. Every field
//! has a default, so a partial file only overrides what it names and a missing
//! file yields [`Config::default`].

use crate::constants::{MAX_PHOTOS, strip};
use crate::errors::{ConfigError, LayoutError};
use crate::gesture::GestureConfig;
use crate::layout::{LayoutConfig, Orientation, Surface};
use crate::pipelines::photo::encoding::EncodingQuality;
use crate::session::SessionTiming;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_DIR: &str = "photobooth";
const CONFIG_FILE: &str = "config.json";

/// Base size used for each strip surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceBases {
    pub thumbnail: u32,
    pub selection_preview: u32,
    pub export: u32,
    pub capture: u32,
}

impl Default for SurfaceBases {
    fn default() -> Self {
        Self {
            thumbnail: Surface::Thumbnail.default_base(),
            selection_preview: Surface::SelectionPreview.default_base(),
            export: Surface::Export.default_base(),
            capture: Surface::Capture.default_base(),
        }
    }
}

impl SurfaceBases {
    pub fn base(&self, surface: Surface) -> u32 {
        match surface {
            Surface::Thumbnail => self.thumbnail,
            Surface::SelectionPreview => self.selection_preview,
            Surface::Export => self.export,
            Surface::Capture => self.capture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout preselected on start
    pub layout: LayoutConfig,
    /// Wave detection thresholds
    pub gesture: GestureConfig,
    /// Countdown, shutter and polling periods
    pub timing: SessionTiming,
    pub bases: SurfaceBases,
    /// Photo cap per session (at most 6)
    pub max_photos: usize,
    /// JPEG quality of captured photos
    pub capture_quality: EncodingQuality,
    /// Square image drawn in the strip corner
    pub stamp_path: PathBuf,
    /// Where strips (and kept frames) are written; `None` means the pictures folder
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            gesture: GestureConfig::default(),
            timing: SessionTiming::default(),
            bases: SurfaceBases::default(),
            max_photos: MAX_PHOTOS,
            capture_quality: EncodingQuality::High,
            stamp_path: PathBuf::from(strip::DEFAULT_STAMP_PATH),
            output_dir: None,
        }
    }
}

impl Config {
    /// `<config dir>/photobooth`, if the platform has a config directory
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load from the default location; defaults when there is no file
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Like [`Config::load`], but an unreadable or malformed file falls back to defaults
    pub fn load_or_default() -> Self {
        Self::or_default(Self::load())
    }

    pub fn load_from_or_default(path: &Path) -> Self {
        Self::or_default(Self::load_from(path))
    }

    fn or_default(loaded: Result<Self, ConfigError>) -> Self {
        loaded.unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring configuration file, using defaults");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, json).map_err(io_error)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Layout from command-line overrides, falling back to the configured one
    pub fn resolve_layout(
        &self,
        count: Option<u8>,
        orientation: Option<Orientation>,
    ) -> Result<LayoutConfig, LayoutError> {
        LayoutConfig::new(
            count.unwrap_or(self.layout.count()),
            orientation.unwrap_or(self.layout.orientation()),
        )
    }

    /// Photo cap, never above 6 and never below the layout count
    pub fn session_capacity(&self, layout: &LayoutConfig) -> usize {
        self.max_photos
            .min(MAX_PHOTOS)
            .max(layout.count() as usize)
    }

    /// Output directory, defaulting to `~/Pictures/photobooth`
    pub fn photo_directory(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
                .join(APP_DIR)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"max_photos": 4, "gesture": {"buffer_size": 8}}"#).unwrap();
        assert_eq!(config.max_photos, 4);
        assert_eq!(config.gesture.buffer_size, 8);
        assert_eq!(config.gesture.min_reversals, 2);
        assert_eq!(config.bases.export, 320);
        assert_eq!(config.stamp_path, PathBuf::from("qr.jpg"));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let err = serde_json::from_str::<Config>(r#"{"layout": {"count": 9}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_layout_overrides_fall_back_to_config() {
        let config = Config {
            layout: LayoutConfig::new(4, Orientation::Landscape).unwrap(),
            ..Config::default()
        };
        assert_eq!(config.resolve_layout(None, None).unwrap(), config.layout);

        let layout = config.resolve_layout(Some(2), None).unwrap();
        assert_eq!(layout.count(), 2);
        assert_eq!(layout.orientation(), Orientation::Landscape);

        let layout = config.resolve_layout(None, Some(Orientation::Portrait)).unwrap();
        assert_eq!(layout.count(), 4);
        assert_eq!(layout.orientation(), Orientation::Portrait);

        assert!(config.resolve_layout(Some(7), None).is_err());
    }

    #[test]
    fn test_capacity_bounds() {
        let mut config = Config::default();
        let layout = LayoutConfig::new(4, Orientation::Landscape).unwrap();
        config.max_photos = 2;
        assert_eq!(config.session_capacity(&layout), 4);
        config.max_photos = 20;
        assert_eq!(config.session_capacity(&layout), 6);
    }
}
