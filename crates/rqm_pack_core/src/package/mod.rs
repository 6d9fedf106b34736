//! Building the distributable archive.
//!
//! [`package`] runs the standard pipeline (Resolve, Stage, Archive) for a
//! [`BuildRequest`] and returns a [`BuildReport`]. [`inspect`] runs only
//! the read-only metadata resolution.

pub mod archive;
mod patterns;
pub mod staging;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::logging::{BuildLogger, LogConfig};
use crate::orchestrator::steps::resolve_metadata;
use crate::orchestrator::{
    create_standard_pipeline, BuildState, Context, PipelineError, PipelineResult, ProgressCallback,
    PipelineStep, ResolveStep, ResolvedMetadata, StepResult,
};

pub use patterns::ExcludePatterns;

/// Which metadata layout the repository uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageMode {
    /// `blender_manifest.toml` + `__version__` (extension platform).
    #[default]
    Extension,
    /// `bl_info['version']` tuple only (pre-extension add-on zip).
    LegacyAddon,
}

impl fmt::Display for PackageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageMode::Extension => f.write_str("extension"),
            PackageMode::LegacyAddon => f.write_str("legacy add-on"),
        }
    }
}

/// What to build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Repository root; the archive is written here.
    pub root: PathBuf,
    pub mode: PackageMode,
    /// Version override. Extension builds still require both declared
    /// versions to match it.
    pub version: Option<String>,
    /// Staging folder override (else `paths.out_folder`).
    pub out_folder: Option<String>,
}

impl BuildRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: PackageMode::default(),
            version: None,
            out_folder: None,
        }
    }

    pub fn with_mode(mut self, mode: PackageMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_out_folder(mut self, out_folder: impl Into<String>) -> Self {
        self.out_folder = Some(out_folder.into());
        self
    }

    /// Name used for errors and the build log: the root folder's name.
    pub fn build_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "build".to_string())
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub mode: PackageMode,
    pub folder_id: String,
    pub version: String,
    pub archive_path: PathBuf,
    pub archive_name: String,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
    pub size_bytes: u64,
    pub staging_root: PathBuf,
    /// Staged files relative to `staging_root`.
    pub staged_files: Vec<PathBuf>,
    /// Package entries dropped by exclude patterns.
    pub skipped: Vec<PathBuf>,
}

impl BuildReport {
    fn from_state(state: BuildState) -> Option<Self> {
        let metadata = state.metadata?;
        let staging = state.staging?;
        let archive = state.archive?;
        Some(Self {
            mode: metadata.mode,
            folder_id: metadata.folder_id,
            version: metadata.version,
            archive_path: archive.archive_path,
            archive_name: archive.archive_name,
            sha256: archive.sha256,
            size_bytes: archive.size_bytes,
            staging_root: staging.staging_root,
            staged_files: staging.files,
            skipped: staging.skipped,
        })
    }

    /// `Created <zip> (sha256=<hex>)`
    pub fn summary_line(&self) -> String {
        format!("Created {} (sha256={})", self.archive_name, self.sha256)
    }
}

/// Build the archive, creating a logger from `settings.logging`.
pub fn package(request: BuildRequest, settings: Settings) -> PipelineResult<BuildReport> {
    let build_name = request.build_name();
    let log_dir = settings
        .logging
        .write_log_file
        .then(|| request.root.join(&settings.logging.logs_folder));

    let logger = BuildLogger::new(
        &build_name,
        log_dir.as_deref(),
        LogConfig::from(&settings.logging),
        None,
    )
    .map_err(|e| PipelineError::setup_failed(&build_name, format!("log file: {}", e)))?;

    package_with_logger(request, settings, Arc::new(logger), None)
}

/// Build the archive with a caller-supplied logger and progress callback.
pub fn package_with_logger(
    request: BuildRequest,
    settings: Settings,
    logger: Arc<BuildLogger>,
    progress: Option<ProgressCallback>,
) -> PipelineResult<BuildReport> {
    let build_name = request.build_name();
    let exclude = ExcludePatterns::new(&settings.package.exclude_patterns).map_err(|e| {
        PipelineError::setup_failed(&build_name, format!("invalid exclude pattern: {}", e))
    })?;

    let mut ctx = Context::new(request, settings, &build_name, Arc::clone(&logger), exclude);
    if let Some(callback) = progress {
        ctx = ctx.with_progress_callback(callback);
    }

    let pipeline = create_standard_pipeline();
    let mut state = BuildState::new();
    if let Err(e) = pipeline.run(&ctx, &mut state) {
        logger.show_tail(&build_name);
        return Err(e);
    }

    let report = BuildReport::from_state(state).ok_or_else(|| {
        PipelineError::setup_failed(&build_name, "pipeline finished without an archive")
    })?;
    logger.success(&report.summary_line());
    Ok(report)
}

/// Resolve id and version without touching the filesystem.
pub fn inspect(request: BuildRequest, settings: Settings) -> StepResult<ResolvedMetadata> {
    let build_name = request.build_name();
    let ctx = Context::new(
        request,
        settings,
        &build_name,
        Arc::new(BuildLogger::tracing_only(&build_name)),
        ExcludePatterns::default(),
    );

    let step = ResolveStep::new();
    step.validate_input(&ctx, &BuildState::default())?;
    resolve_metadata(&ctx)
}
