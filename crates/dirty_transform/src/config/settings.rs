//! # Dirty Tracking Configuration
//!
//! Settings for trackers and for the binaries that host them. Every field has a
//! default, so partial files are accepted.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// # Tracker Configuration
///
/// Controls queue preallocation and flush diagnostics for a
/// [`DirtyTracker`](crate::dirty::DirtyTracker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Initial capacity of each dirty queue
    pub queue_capacity: usize,
    /// Emit a `debug!` summary after every flush
    pub log_flushes: bool,
}

impl TrackerConfig {
    /// Create a new tracker configuration
    pub fn new() -> Self {
        Self {
            queue_capacity: 64,
            log_flushes: false,
        }
    }

    /// Set the initial queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Enable or disable flush logging
    pub fn with_flush_logging(mut self, enabled: bool) -> Self {
        self.log_flushes = enabled;
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Configuration
///
/// Top-level configuration read by binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirtyConfig {
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Settings for trackers created from this configuration
    pub tracker: TrackerConfig,
}

impl DirtyConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            tracker: TrackerConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("unknown log level: {}", self.log_level)));
        }
        Ok(())
    }
}

impl Default for DirtyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for DirtyConfig {}
