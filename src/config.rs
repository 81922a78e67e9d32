//! Configuration loading and management
//!
//! Handles parsing of `dayplan.toml` configuration files. Every field is
//! defaulted, so an absent or partial file is always usable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Configuration file name, looked up in the current directory and the
/// platform config directory
pub const CONFIG_FILE: &str = "dayplan.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Timeline configuration
    #[serde(default)]
    pub timeline: TimelineConfig,
}

/// Store-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Explicit store file path (overrides the platform data directory)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Timeline-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Snap granularity for drags and clicks, in minutes
    #[serde(default = "default_snap_minutes")]
    pub snap_minutes: u32,

    /// Duration of tasks created from a timeline click, in minutes
    #[serde(default = "default_task_minutes")]
    pub default_task_minutes: i64,
}

fn default_snap_minutes() -> u32 {
    crate::geometry::SNAP_MINUTES
}

fn default_task_minutes() -> i64 {
    crate::task::DEFAULT_TASK_MINUTES
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            snap_minutes: default_snap_minutes(),
            default_task_minutes: default_task_minutes(),
        }
    }
}

impl Config {
    /// Load configuration from a file, validating the parsed values
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `dayplan.toml` from the current directory if present, else defaults
    pub fn discover() -> Result<Self> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }
        Ok(Config::default())
    }

    fn validate(&self) -> Result<()> {
        if self.timeline.snap_minutes == 0 || self.timeline.snap_minutes > 60 {
            return Err(Error::InvalidConfig(format!(
                "snap_minutes must be between 1 and 60, got {}",
                self.timeline.snap_minutes
            )));
        }
        if self.timeline.default_task_minutes <= 0 {
            return Err(Error::InvalidConfig(format!(
                "default_task_minutes must be positive, got {}",
                self.timeline.default_task_minutes
            )));
        }
        Ok(())
    }
}
