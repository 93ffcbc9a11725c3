//! Configuration management for ffbatch.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults filled in for missing keys on load
//!
//! # Example
//!
//! ```no_run
//! use ffbatch_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/ffbatch.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Encoder: {}", config.settings().tools.ffmpeg);
//!
//! config.settings_mut().output.use_ok_subdir = true;
//! config.update_section(ConfigSection::Output).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EncodingSettings, LoggingSettings, OutputSettings, PathSettings, Settings,
    SpliceSettings, ToolSettings,
};
