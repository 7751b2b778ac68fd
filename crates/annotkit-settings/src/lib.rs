//! AnnotKit Settings Crate
//!
//! Handles editor configuration: interaction thresholds, zoom limits, history
//! depth and the default style applied to newly drawn annotations.

pub mod config;
pub mod error;

pub use config::{default_config_path, EditorConfig, CONFIG_FILE_NAME};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
