//! Trackforge Settings Crate
//!
//! Handles builder configuration and the file-backed cold storage.

pub mod config;
pub mod error;
pub mod storage;

pub use config::{
    BuilderConfig, ConstructionSettings, GeneralSettings, PaintingSettings, StorageSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use storage::{cold_storage_from_config, JsonFileColdStorage};
