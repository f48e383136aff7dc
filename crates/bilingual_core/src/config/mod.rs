//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use bilingual_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/bilingual.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Title: {}", config.settings().languages.title);
//!
//! config.settings_mut().interleave.fudge_divisor = 4.0;
//! config.update_section(ConfigSection::Interleave).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, ExportSettings, InterleaveSettings, LoggingSettings, PathSettings,
    ProcessingSettings, SegmentationSettings, Settings,
};
