//! Extension metadata: manifest and `__init__.py` version markers.
//!
//! Two files declare the add-on's identity:
//! - `blender_manifest.toml` carries the extension `id` and `version`
//! - `__init__.py` carries `__version__` (extension builds) and the
//!   `bl_info` version tuple (legacy add-on builds)
//!
//! Everything here is read-only; nothing touches the filesystem beyond
//! reading the two files.

mod init_file;
mod manifest;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use init_file::{parse_bl_info_version, parse_init_version};
pub use manifest::{parse_manifest, ExtensionManifest};

/// Errors raised while reading or parsing metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    ManifestSyntax {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to locate {key} in {file}")]
    MissingKey { key: &'static str, file: String },

    #[error("Invalid {key} in {file}: {message}")]
    InvalidKey {
        key: &'static str,
        file: String,
        message: String,
    },

    #[error("Failed to locate __version__ in {file}")]
    InitVersionNotFound { file: String },

    #[error("Could not find version tuple in {file}")]
    BlInfoVersionNotFound { file: String },

    #[error("Parsed empty version tuple in {file}")]
    EmptyVersionTuple { file: String },
}

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Read and parse an extension manifest from disk.
pub fn read_manifest(path: &Path) -> MetadataResult<ExtensionManifest> {
    let text = read_text(path)?;
    parse_manifest(&text, &display_name(path))
}

/// Read `__version__` from an `__init__.py` file.
pub fn read_init_version(path: &Path) -> MetadataResult<String> {
    let text = read_text(path)?;
    parse_init_version(&text, &display_name(path))
}

/// Read the `bl_info` version tuple from an `__init__.py` file.
pub fn read_bl_info_version(path: &Path) -> MetadataResult<String> {
    let text = read_text(path)?;
    parse_bl_info_version(&text, &display_name(path))
}

/// Base name used for the archive: underscores become dashes.
pub fn archive_base_name(extension_id: &str) -> String {
    extension_id.replace('_', "-")
}

/// Archive file name: `<id-with-dashes>-v<version>.zip`.
pub fn archive_file_name(extension_id: &str, version: &str) -> String {
    format!("{}-v{}.zip", archive_base_name(extension_id), version)
}

fn read_text(path: &Path) -> MetadataResult<String> {
    fs::read_to_string(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn archive_name_uses_dashes() {
        assert_eq!(
            archive_file_name("render_queue_manager_x", "1.10.6"),
            "render-queue-manager-x-v1.10.6.zip"
        );
        assert_eq!(archive_base_name("plain"), "plain");
    }

    #[test]
    fn read_manifest_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_manifest(&dir.path().join("blender_manifest.toml")).unwrap_err();
        assert!(matches!(err, MetadataError::Read { .. }));
        assert!(err.to_string().contains("blender_manifest.toml"));
    }

    #[test]
    fn read_manifest_names_the_file_in_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blender_manifest.toml");
        fs::write(&path, "version = \"1.0.0\"\n").unwrap();

        let err = read_manifest(&path).unwrap_err();
        assert_eq!(err.to_string(), "Failed to locate id in blender_manifest.toml");
    }

    #[test]
    fn read_init_version_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("__init__.py");
        fs::write(&path, "__version__ = '2.0.1'\n").unwrap();

        assert_eq!(read_init_version(&path).unwrap(), "2.0.1");
    }
}
