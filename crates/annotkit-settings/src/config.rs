//! Editor configuration.
//!
//! [`EditorConfig`] gathers every tunable threshold of the editing engine.
//! Values default to the constants in `annotkit_core` and can be persisted as
//! TOML (preferred) or JSON.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use annotkit_core::constants::*;
use annotkit_core::{Font, Style, Vector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the editor configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "editor.toml";

/// Tunable parameters of the annotation editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undoable commands retained
    pub history_limit: usize,
    /// Lower zoom bound
    pub min_zoom: f64,
    /// Upper zoom bound
    pub max_zoom: f64,
    /// Factor applied per zoom step
    pub zoom_step: f64,
    /// Freehand point coalescing distance (image-space)
    pub min_segment_length: f64,
    /// Drawn shapes smaller than this are discarded (image-space)
    pub min_shape_size: f64,
    /// Slack added to stroke hit-testing (image-space)
    pub hit_tolerance: f64,
    /// Resize handle size (screen pixels)
    pub handle_size: f64,
    /// Arrow-key pan distance (screen pixels)
    pub pan_step: f64,
    /// Value recorded as `createdBy` on new annotations
    pub author: String,
    /// Offset applied to pasted annotations (image-space)
    pub paste_offset: Vector,
    /// Style given to newly drawn annotations
    pub default_style: Style,
    /// Font given to new text and callout annotations
    pub default_font: Font,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: HISTORY_LIMIT,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            min_segment_length: MIN_SEGMENT_LENGTH,
            min_shape_size: MIN_SHAPE_SIZE,
            hit_tolerance: HIT_TOLERANCE,
            handle_size: HANDLE_SIZE,
            pan_step: PAN_STEP,
            author: String::new(),
            paste_offset: Vector::new(PASTE_OFFSET.0, PASTE_OFFSET.1),
            default_style: Style::default(),
            default_font: Font::default(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML, by extension)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML, by extension)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved editor config to {}", path.display());
        Ok(())
    }

    /// Load from the platform config directory, falling back to defaults when
    /// no file exists yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.history_limit == 0 {
            return Err(ConfigError::out_of_range("history_limit", self.history_limit));
        }
        if !(self.min_zoom > 0.0) {
            return Err(ConfigError::out_of_range("min_zoom", self.min_zoom));
        }
        if !(self.max_zoom >= self.min_zoom) {
            return Err(ConfigError::out_of_range("max_zoom", self.max_zoom));
        }
        if !(self.zoom_step > 1.0) {
            return Err(ConfigError::out_of_range("zoom_step", self.zoom_step));
        }
        if self.min_segment_length < 0.0 {
            return Err(ConfigError::out_of_range(
                "min_segment_length",
                self.min_segment_length,
            ));
        }
        if self.min_shape_size < 0.0 {
            return Err(ConfigError::out_of_range("min_shape_size", self.min_shape_size));
        }
        if self.hit_tolerance < 0.0 {
            return Err(ConfigError::out_of_range("hit_tolerance", self.hit_tolerance));
        }
        if !(self.default_style.stroke_width > 0.0) {
            return Err(ConfigError::out_of_range(
                "default_style.stroke_width",
                self.default_style.stroke_width,
            ));
        }
        if !(self.default_font.size > 0.0) {
            return Err(ConfigError::out_of_range(
                "default_font.size",
                self.default_font.size,
            ));
        }
        Ok(())
    }

    /// Clamp a zoom factor to the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// `<config dir>/annotkit/editor.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| {
        SettingsError::ConfigDirectory("no configuration directory on this platform".to_string())
    })?;
    Ok(base.join("annotkit").join(CONFIG_FILE_NAME))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
