//! Configuration module for gauge-trace
//!
//! The panel configuration is the only state that outlives a session:
//! the path expression, the trailing window, the low-pass coefficient and
//! the styling the rendering layer needs. Sample data is never persisted.
//!
//! # Files
//!
//! Configs are JSON by default (matching the host's saved panel state),
//! or TOML when the file extension is `.toml`. The default location is
//! `panel.json` in the platform data directory under `dev.gauge-trace`:
//!
//! - **Linux**: `~/.local/share/dev.gauge-trace/`
//! - **macOS**: `~/Library/Application Support/dev.gauge-trace/`
//! - **Windows**: `%APPDATA%\dev.gauge-trace\`
//!
//! # Example
//!
//! ```ignore
//! use gauge_trace::config::PanelConfig;
//! use gauge_trace::session::SignalSession;
//!
//! let config = PanelConfig::load_or_default("panel.json");
//! let session = SignalSession::new(config.data.message_path(), config.session_settings());
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{GaugeError, Result, ResultExt};
use crate::session::SessionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.gauge-trace";

/// Default config filename
pub const CONFIG_FILE: &str = "panel.json";

/// Current config format version
pub const CONFIG_VERSION: u32 = 1;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default panel config
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// On-disk encoding of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension (JSON unless `.toml`)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

// ==================== Panel Config ====================

/// Persisted panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Version for future migration support
    #[serde(default = "default_config_version")]
    pub version: u32,

    #[serde(default)]
    pub data: DataSettings,

    #[serde(default)]
    pub view: ViewSettings,
}

fn default_config_version() -> u32 {
    CONFIG_VERSION
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: DataSettings::default(),
            view: ViewSettings::default(),
        }
    }
}

impl PanelConfig {
    /// Create a config for a path expression with default settings
    pub fn new(message_path: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.data.set_message_path(message_path);
        config
    }

    /// Parse a config from text in the given format.
    ///
    /// Legacy fields are migrated and numeric settings clamped.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let mut config: PanelConfig = match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| GaugeError::Config(format!("Failed to parse JSON config: {}", e)))?,
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| GaugeError::Config(format!("Failed to parse TOML config: {}", e)))?,
        };

        if config.data.migrate_legacy() {
            tracing::info!(
                "Migrated legacy topic/field settings to path '{}'",
                config.data.message_path()
            );
        }
        config.data.normalize();
        Ok(config)
    }

    /// Serialize to text in the given format
    pub fn to_string_with_format(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| GaugeError::Serialization(e.to_string())),
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| GaugeError::Serialization(e.to_string())),
        }
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GaugeError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_str_with_format(&content, ConfigFormat::from_path(path))
            .with_context(|| format!("Loading {:?}", path))
    }

    /// Load a config file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load panel config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GaugeError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self
            .to_string_with_format(ConfigFormat::from_path(path))
            .context("Failed to encode panel config")?;
        std::fs::write(path, content).map_err(|e| {
            GaugeError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Copy with every numeric setting clamped into range
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.data.normalize();
        config
    }

    /// Session settings derived from the data settings
    pub fn session_settings(&self) -> SessionSettings {
        let data = self.normalized().data;
        SessionSettings {
            window_ms: data.time_window_ms(),
            filter_alpha: data.alpha,
            ..SessionSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/panel.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/panel.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/panel.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("panel")), ConfigFormat::Json);
    }

    #[test]
    fn test_parse_host_saved_state() {
        let json = r#"{
            "data": {"messagePath": "/odom.twist.linear.x.@abs", "min": 0, "max": 120, "timeWindow": 20, "alpha": 0.25},
            "view": {"component": "timeSeriesChart"}
        }"#;
        let config = PanelConfig::from_str_with_format(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.data.message_path(), "/odom.twist.linear.x.@abs");
        assert_eq!(config.view.component, DisplayComponent::TimeSeriesChart);

        let settings = config.session_settings();
        assert_eq!(settings.window_ms, 20_000);
        assert_eq!(settings.filter_alpha, 0.25);
    }

    #[test]
    fn test_parse_migrates_and_clamps() {
        let json = r#"{"data": {"topic": "/speed", "timeWindow": 0.2}}"#;
        let config = PanelConfig::from_str_with_format(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.data.message_path(), "/speed");
        assert_eq!(config.data.time_window, MIN_TIME_WINDOW_SECS);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = PanelConfig::new("/imu.angular_velocity.z.@derivative");
        config.data.alpha = 0.5;
        config.view.component = DisplayComponent::SteeringWheel;

        let text = config.to_string_with_format(ConfigFormat::Toml).unwrap();
        let parsed = PanelConfig::from_str_with_format(&text, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let err = PanelConfig::from_str_with_format("{not json", ConfigFormat::Json).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON config"));
    }

    #[test]
    fn test_session_settings_clamp_window() {
        let mut config = PanelConfig::default();
        config.data.time_window = 600.0;
        assert_eq!(config.session_settings().window_ms, 300_000);
    }

    #[test]
    fn test_default_config_path_uses_app_id() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(Path::new(APP_ID).join(CONFIG_FILE)));
        }
    }
}
