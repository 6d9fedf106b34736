//! Resolve step: read metadata and check versions.
//!
//! Reads files only. Every failure here happens before the staging
//! folder is touched.

use crate::metadata;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{BuildState, Context, ResolvedMetadata, StepOutcome};
use crate::package::PackageMode;

/// Reads the manifest / `__init__.py` markers and fixes the build version.
pub struct ResolveStep;

impl ResolveStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResolveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ResolveStep {
    fn name(&self) -> &str {
        "Resolve"
    }

    fn description(&self) -> &str {
        "Read extension metadata and verify versions agree"
    }

    fn validate_input(&self, ctx: &Context, _state: &BuildState) -> StepResult<()> {
        if let Some(ref version) = ctx.request.version {
            if version.trim().is_empty() {
                return Err(StepError::invalid_input("requested version is empty"));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut BuildState) -> StepResult<StepOutcome> {
        let resolved = resolve_metadata(ctx)?;
        ctx.logger.info(&format!(
            "Packaging {} v{} ({})",
            resolved.folder_id, resolved.version, resolved.mode
        ));
        state.metadata = Some(resolved);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &BuildState) -> StepResult<()> {
        match state.metadata {
            Some(ref m) if !m.folder_id.is_empty() && !m.version.is_empty() => Ok(()),
            Some(_) => Err(StepError::invalid_output("resolved id or version is empty")),
            None => Err(StepError::invalid_output("metadata not recorded")),
        }
    }
}

/// Resolve folder id and version for the requested mode.
pub fn resolve_metadata(ctx: &Context) -> StepResult<ResolvedMetadata> {
    let requested = ctx
        .request
        .version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let resolved = match ctx.request.mode {
        PackageMode::Extension => resolve_extension(ctx, requested)?,
        PackageMode::LegacyAddon => resolve_legacy(ctx, requested)?,
    };

    // The version becomes part of the archive file name.
    if resolved.version.contains(['/', '\\']) {
        return Err(StepError::invalid_input(format!(
            "version '{}' contains a path separator",
            resolved.version
        )));
    }
    Ok(resolved)
}

fn resolve_extension(ctx: &Context, requested: Option<&str>) -> StepResult<ResolvedMetadata> {
    let manifest_path = ctx.manifest_path();
    let init_path = ctx.init_path();
    let init_file = ctx.settings.paths.init_file.as_str();

    let manifest = metadata::read_manifest(&manifest_path)?;
    ctx.logger.debug(&format!(
        "{}: id={} version={}",
        ctx.settings.paths.manifest_file, manifest.id, manifest.version
    ));

    // Required even with an override: both sources must agree with it.
    let init_version = metadata::read_init_version(&init_path)?;
    ctx.logger
        .debug(&format!("{}: __version__={}", init_file, init_version));

    let version = requested.unwrap_or(init_version.as_str()).to_string();

    if version != manifest.version {
        return Err(StepError::version_mismatch(
            &version,
            &manifest.version,
            "manifest",
        ));
    }
    if version != init_version {
        return Err(StepError::version_mismatch(&version, &init_version, "__init__"));
    }

    Ok(ResolvedMetadata {
        mode: PackageMode::Extension,
        folder_id: manifest.id.clone(),
        version,
        manifest_version: Some(manifest.version.clone()),
        init_version: Some(init_version),
        manifest: Some(manifest),
    })
}

fn resolve_legacy(ctx: &Context, requested: Option<&str>) -> StepResult<ResolvedMetadata> {
    let folder_id = ctx.settings.package.legacy_folder_id.trim().to_string();
    if folder_id.is_empty() {
        return Err(StepError::invalid_input("package.legacy_folder_id is empty"));
    }

    let (version, init_version) = match requested {
        Some(v) => (v.to_string(), None),
        None => {
            let declared = metadata::read_bl_info_version(&ctx.init_path())?;
            ctx.logger
                .debug(&format!("bl_info version: {}", declared));
            (declared.clone(), Some(declared))
        }
    };

    Ok(ResolvedMetadata {
        mode: PackageMode::LegacyAddon,
        folder_id,
        version,
        manifest_version: None,
        init_version,
        manifest: None,
    })
}
