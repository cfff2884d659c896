//! Builder configuration
//!
//! Supports JSON and TOML files stored in the platform config directory.
//!
//! Configuration is organized into sections:
//! - General (logging, initial build direction)
//! - Construction defaults (placement flags, piece defaults, commit policy)
//! - Painting (selection highlight scheme and colours)
//! - Storage (cold storage location)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use trackforge_core::{BuildDirection, TrackColour};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Application directory name under the platform config dir
const APP_DIR: &str = "trackforge";
/// Config file name
const CONFIG_FILE: &str = "config.toml";

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Direction the model starts building in
    pub default_build_direction: BuildDirection,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_build_direction: BuildDirection::Next,
        }
    }
}

/// Construction defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionSettings {
    /// Host flags sent with ghost placements
    pub ghost_place_flags: u32,
    pub default_brake_speed: u8,
    pub default_colour: u8,
    /// 4 leaves the seat rotation unchanged
    pub default_seat_rotation: u8,
    /// Remove the preview ghost before committing a real piece
    pub remove_ghost_before_commit: bool,
    /// Put the ghost back when a commit is rejected
    pub restore_ghost_on_failed_commit: bool,
}

impl Default for ConstructionSettings {
    fn default() -> Self {
        Self {
            ghost_place_flags: 104,
            default_brake_speed: 0,
            default_colour: 0,
            default_seat_rotation: 4,
            remove_ghost_before_commit: true,
            restore_ghost_on_failed_commit: true,
        }
    }
}

/// Selection painting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintingSettings {
    pub enabled: bool,
    /// Structure colour scheme index borrowed for the highlight
    pub highlight_scheme: u8,
    pub highlight_colours: TrackColour,
}

impl Default for PaintingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            highlight_scheme: 3,
            highlight_colours: TrackColour::new(2, 2, 2),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// File for cold storage; kept in memory when unset
    pub cold_storage_path: Option<PathBuf>,
}

/// Complete builder configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub general: GeneralSettings,
    pub construction: ConstructionSettings,
    pub painting: PaintingSettings,
    pub storage: StorageSettings,
}

impl BuilderConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::config_file_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Platform config directory for trackforge
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Default config file path
    pub fn config_file_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Create the config directory if missing
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir).map_err(|source| SettingsError::ConfigDirectory {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let bounded = [
            (
                "construction.default_seat_rotation",
                self.construction.default_seat_rotation,
                4,
            ),
            ("painting.highlight_scheme", self.painting.highlight_scheme, 3),
        ];
        for (key, value, max) in bounded {
            if value > max {
                return Err(ConfigError::TooLarge {
                    key,
                    value: value.into(),
                    max: max.into(),
                });
            }
        }

        if self.general.log_level.trim().is_empty() {
            return Err(ConfigError::Empty {
                key: "general.log_level",
            });
        }

        Ok(())
    }
}

enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
