//! Core types for the build pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::logging::BuildLogger;
use crate::metadata::ExtensionManifest;
use crate::package::{BuildRequest, ExcludePatterns, PackageMode};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Mutable results go in `BuildState`.
pub struct Context {
    /// What to build.
    pub request: BuildRequest,
    /// Packager settings.
    pub settings: Settings,
    /// Build name used in errors and log file names.
    pub build_name: String,
    /// Per-build logger.
    pub logger: Arc<BuildLogger>,
    /// Compiled `package.exclude_patterns`.
    pub exclude: ExcludePatterns,
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a build.
    pub fn new(
        request: BuildRequest,
        settings: Settings,
        build_name: impl Into<String>,
        logger: Arc<BuildLogger>,
        exclude: ExcludePatterns,
    ) -> Self {
        Self {
            request,
            settings,
            build_name: build_name.into(),
            logger,
            exclude,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.request.root
    }

    /// Staging folder name (request override, else settings).
    pub fn out_folder(&self) -> &str {
        self.request
            .out_folder
            .as_deref()
            .unwrap_or(&self.settings.paths.out_folder)
    }

    /// Absolute staging folder.
    pub fn out_dir(&self) -> PathBuf {
        self.root().join(self.out_folder())
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(&self.settings.paths.manifest_file)
    }

    pub fn init_path(&self) -> PathBuf {
        self.root().join(&self.settings.paths.init_file)
    }

    pub fn package_dir(&self) -> PathBuf {
        self.root().join(&self.settings.paths.package_dir)
    }

    /// Top-level files copied into the staging folder for this mode.
    pub fn top_level_files(&self) -> Vec<String> {
        let mut files = self.settings.package.include_files.clone();
        if self.request.mode == PackageMode::Extension
            && !files.contains(&self.settings.paths.manifest_file)
        {
            files.push(self.settings.paths.manifest_file.clone());
        }
        files
    }
}

/// Mutable state that accumulates results from pipeline steps.
///
/// Each step writes its own section once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildState {
    /// When the build started.
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResolvedMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<StageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveOutput>,
}

impl BuildState {
    pub fn new() -> Self {
        Self {
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn has_staging(&self) -> bool {
        self.staging.is_some()
    }
}

/// Output from the Resolve step: who and what is being packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMetadata {
    pub mode: PackageMode,
    /// Staging folder name and archive base (before dash conversion).
    pub folder_id: String,
    /// Version the archive is built as.
    pub version: String,
    /// Version declared in the manifest (extension builds).
    pub manifest_version: Option<String>,
    /// Version declared in `__init__.py`.
    pub init_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ExtensionManifest>,
}

impl ResolvedMetadata {
    /// `<id-with-dashes>-v<version>.zip`
    pub fn archive_file_name(&self) -> String {
        crate::metadata::archive_file_name(&self.folder_id, &self.version)
    }
}

/// Output from the Stage step.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    /// The wiped-and-recreated staging folder.
    pub out_dir: PathBuf,
    /// `<out_dir>/<folder_id>`
    pub staging_root: PathBuf,
    /// Staged files relative to `staging_root`, sorted.
    pub files: Vec<PathBuf>,
    /// Package entries left out by exclude patterns.
    pub skipped: Vec<PathBuf>,
}

/// Output from the Archive step.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutput {
    pub archive_path: PathBuf,
    pub archive_name: String,
    /// Lowercase hex SHA-256 of the finished archive.
    pub sha256: String,
    pub size_bytes: u64,
    /// Zip entry names in write order.
    pub entries: Vec<String>,
}

/// Result of executing a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (with reason).
    Skipped(String),
}
