//! Configuration management for `RustView`
//!
//! This module provides the `ConfigManager` for loading and saving the
//! viewer settings file in TOML format.

mod manager;
pub mod settings;

pub use manager::ConfigManager;
pub use settings::{ViewerSettings, WindowSettings};
