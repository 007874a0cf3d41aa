use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/clightd/config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Which bus the service registers on
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

/// How devices are enumerated and opened
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Udev,
    Sysfs,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub bus: BusKind,
    pub backend: Backend,
    /// Root of the tree walked by the sysfs backend
    pub sysfs_root: PathBuf,
    pub capture: CaptureConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            backend: Backend::Udev,
            sysfs_root: PathBuf::from("/sys"),
            capture: CaptureConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Register `captureframes` on the bus
    pub enabled: bool,
    /// Requested frame width; the driver may pick the nearest it supports
    pub width: u32,
    pub height: u32,
    /// Number of mmap buffers queued on the capture stream
    pub buffers: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 160,
            height: 120,
            buffers: 4,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive for this crate, overridden by RUST_LOG
    pub level: String,
    /// Also log to the systemd journal when it is reachable
    pub journald: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            journald: true,
        }
    }
}

impl Config {
    /// Candidate config files, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("clightd").join("config.toml"));
        }
        paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
        paths
    }

    /// The explicit path if given, otherwise the first search path that exists
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        }
    }

    /// Load config from `path`; without a path the defaults apply
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate a TOML document
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sysfs_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation("sysfs_root must not be empty".into()));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(ConfigError::Validation(
                "capture width and height must be positive".into(),
            ));
        }
        if !(1..=32).contains(&self.capture.buffers) {
            return Err(ConfigError::Validation(
                "capture buffers must be between 1 and 32".into(),
            ));
        }
        Ok(())
    }

    /// Whether `captureframes` is part of the exposed interface
    pub fn capture_enabled(&self) -> bool {
        cfg!(feature = "frame-capture") && self.capture.enabled
    }
}
