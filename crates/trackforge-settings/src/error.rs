//! Settings errors
//!
//! `SettingsError` covers reading and writing config files, `ConfigError`
//! covers the contents of a configuration.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A config file exists but could not be read
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file could not be written
    #[error("Cannot write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The platform config directory could not be created
    #[error("Cannot create config directory {}: {source}", path.display())]
    ConfigDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Cannot encode TOML config: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Problems with configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Only `.toml` and `.json` files are understood
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("{key} must be at most {max}, got {value}")]
    TooLarge {
        key: &'static str,
        value: u32,
        max: u32,
    },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    /// `dirs` knows no config directory for this platform
    #[error("No config directory on {0}")]
    UnsupportedPlatform(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
