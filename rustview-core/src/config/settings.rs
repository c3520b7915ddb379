//! Viewer settings model
//!
//! This module defines the viewer-wide settings stored in config.toml.
//! Command-line flags override anything loaded from here.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Viewer-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Echo diagnostic traces to stdout
    #[serde(default)]
    pub verbose: bool,
    /// Enable debug-level logging
    #[serde(default)]
    pub debug: bool,
    /// Always connect directly, never through the relay
    #[serde(default)]
    pub direct: bool,
    /// Reconnect poll period in milliseconds
    #[serde(default = "default_reconnect_ms")]
    pub reconnect_ms: u64,
    /// Window settings
    #[serde(default)]
    pub window: WindowSettings,
}

impl ViewerSettings {
    /// Returns the reconnect poll period as a [`Duration`]
    #[must_use]
    pub const fn reconnect_period(&self) -> Duration {
        Duration::from_millis(self.reconnect_ms)
    }
}

/// Window-related settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSettings {
    /// Open windows fullscreen
    #[serde(default)]
    pub fullscreen: bool,
    /// Title override; the guest name is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

const fn default_reconnect_ms() -> u64 {
    500
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            direct: false,
            reconnect_ms: default_reconnect_ms(),
            window: WindowSettings::default(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            fullscreen: false,
            title: None,
        }
    }
}
