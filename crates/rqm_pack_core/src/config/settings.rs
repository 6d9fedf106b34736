//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Source and output locations, relative to the repository root.
    #[serde(default)]
    pub paths: PathSettings,

    /// What goes into the archive.
    #[serde(default)]
    pub package: PackageSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration, all relative to the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Staging folder; wiped at the start of every build.
    #[serde(default = "default_out_folder")]
    pub out_folder: String,

    /// Extension manifest file.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Add-on entry point carrying the version markers.
    #[serde(default = "default_init_file")]
    pub init_file: String,

    /// Internal package directory copied recursively.
    #[serde(default = "default_package_dir")]
    pub package_dir: String,
}

fn default_out_folder() -> String {
    "dist".to_string()
}

fn default_manifest_file() -> String {
    "blender_manifest.toml".to_string()
}

fn default_init_file() -> String {
    "__init__.py".to_string()
}

fn default_package_dir() -> String {
    "rqm".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            out_folder: default_out_folder(),
            manifest_file: default_manifest_file(),
            init_file: default_init_file(),
            package_dir: default_package_dir(),
        }
    }
}

/// Archive content configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Top-level files copied into the staging folder.
    ///
    /// The manifest is added on top of these for extension builds.
    #[serde(default = "default_include_files")]
    pub include_files: Vec<String>,

    /// File name patterns skipped while copying the package directory.
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Folder id used for legacy add-on builds (no manifest to read it from).
    #[serde(default = "default_legacy_folder_id")]
    pub legacy_folder_id: String,

    /// Deflate level; `None` uses the zip crate's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i64>,
}

fn default_include_files() -> Vec<String> {
    ["__init__.py", "README.md", "CHANGELOG.md", "LICENSE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    ["__pycache__", "*.pyc", "*.pyo"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_legacy_folder_id() -> String {
    "render_queue_manager_x".to_string()
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            include_files: default_include_files(),
            exclude_patterns: default_exclude_patterns(),
            legacy_folder_id: default_legacy_folder_id(),
            compression_level: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Compact mode: per-file copy lines only go to the tail buffer.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Write a per-build log file under `logs_folder`.
    #[serde(default)]
    pub write_log_file: bool,

    /// Folder for build log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Number of recent lines replayed when a build fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,
}

fn default_true() -> bool {
    true
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_error_tail() -> usize {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            write_log_file: false,
            logs_folder: default_logs_folder(),
            error_tail: default_error_tail(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Package,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 3] = [
        ConfigSection::Paths,
        ConfigSection::Package,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Package => "package",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Source and output locations (relative to the repository root)",
            ConfigSection::Package => "Archive contents",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[package]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("out_folder"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[paths]\nout_folder = \"build\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.paths.out_folder, "build");
        assert_eq!(parsed.paths.package_dir, "rqm");
        assert_eq!(parsed.package.exclude_patterns, vec!["__pycache__", "*.pyc", "*.pyo"]);
        assert!(parsed.logging.compact);
    }

    #[test]
    fn log_level_reads_lowercase() {
        let parsed: Settings = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(parsed.logging.level, LogLevel::Debug);
    }
}
