//! Configuration management for rqm-pack.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults for every key, so the file itself is optional
//!
//! # Example
//!
//! ```no_run
//! use rqm_pack_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new("rqm-pack.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Staging folder: {}", config.settings().paths.out_folder);
//!
//! config.settings_mut().logging.compact = false;
//! config.update_section(ConfigSection::Logging).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, LoggingSettings, PackageSettings, PathSettings, Settings};
