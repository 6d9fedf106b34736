//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Preserves comments and formatting of other sections with toml_edit

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages the packager configuration file.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Default config file name, looked up at the repository root.
    pub const DEFAULT_FILE_NAME: &'static str = "rqm-pack.toml";

    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Load settings for a repository root.
    ///
    /// Uses `explicit` when given (it must exist), otherwise
    /// `<root>/rqm-pack.toml` if present, otherwise defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            let mut manager = Self::new(path);
            manager.load()?;
            return Ok(manager);
        }

        let mut manager = Self::new(root.join(Self::DEFAULT_FILE_NAME));
        if manager.config_path.exists() {
            manager.load()?;
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                manager.config_path.display()
            );
        }
        Ok(manager)
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Note: Changes made here are only in memory until `save()` or
    /// `update_section()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager, keeping only the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", self.config_path.display());
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Returns `true` if a new file was written.
    pub fn load_or_create(&mut self) -> ConfigResult<bool> {
        if self.config_path.exists() {
            self.load()?;
            Ok(false)
        } else {
            self.settings = Settings::default();
            self.save()?;
            Ok(true)
        }
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// Re-reads the file from disk, replaces only the given table, and
    /// writes back atomically. Other sections keep their formatting.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_doc: DocumentMut = self.section_toml(section)?.parse()?;
        doc[section.table_name()] = Item::Table(section_doc.as_table().clone());

        self.atomic_write(&doc.to_string())?;
        Ok(())
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let content = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Package => toml::to_string_pretty(&self.settings.package)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
        };
        Ok(content)
    }

    /// Generate config content with a comment above each section.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# rqm-pack configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n",
        );

        for section in ConfigSection::ALL {
            output.push('\n');
            output.push_str(&format!("# {}\n", section.description()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in self.section_toml(section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Write content to config file atomically.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("rqm-pack.toml");

        let mut manager = ConfigManager::new(&config_path);
        assert!(manager.load_or_create().unwrap());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paths]"));
        assert!(content.contains("[package]"));
        assert!(content.contains("[logging]"));

        // Written file must load back
        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().paths.out_folder, "dist");
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rqm-pack.toml");
        fs::write(&config_path, "[paths]\nout_folder = \"build\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(!manager.load_or_create().unwrap());
        assert_eq!(manager.settings().paths.out_folder, "build");
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::discover(dir.path(), None).unwrap();
        assert_eq!(manager.settings().paths.manifest_file, "blender_manifest.toml");
        assert!(!dir.path().join(ConfigManager::DEFAULT_FILE_NAME).exists());
    }

    #[test]
    fn discover_requires_explicit_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = ConfigManager::discover(dir.path(), Some(&missing));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rqm-pack.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().logging.level = LogLevel::Debug;
        manager.settings_mut().paths.out_folder = "ignored".to_string();
        manager.update_section(ConfigSection::Logging).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("level = \"debug\""));
        assert!(content.contains("out_folder = \"dist\""));
        assert!(content.contains("# rqm-pack configuration"));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rqm-pack.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(!config_path.with_extension("toml.tmp").exists());
    }
}
