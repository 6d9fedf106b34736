//! Stage step: rebuild `<out>/<folder_id>/` from the repository.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{BuildState, Context, StageOutput, StepOutcome};
use crate::package::staging::{copy_tree, is_safe_relative_dir, list_files};

/// Copies the distributable files into a clean staging folder.
pub struct StageStep;

impl StageStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StageStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for StageStep {
    fn name(&self) -> &str {
        "Stage"
    }

    fn description(&self) -> &str {
        "Copy distributable files into a clean staging folder"
    }

    fn validate_input(&self, ctx: &Context, state: &BuildState) -> StepResult<()> {
        let metadata = state
            .metadata
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("metadata not resolved"))?;

        let out_folder = ctx.out_folder();
        if !is_safe_relative_dir(out_folder) {
            return Err(StepError::invalid_input(format!(
                "staging folder '{}' must be a relative path inside the repository",
                out_folder
            )));
        }
        if !is_single_component(&metadata.folder_id) {
            return Err(StepError::invalid_input(format!(
                "extension id '{}' is not usable as a folder name",
                metadata.folder_id
            )));
        }

        let out = normalized(out_folder);
        let package_dir = &ctx.settings.paths.package_dir;
        let package = normalized(package_dir);
        if out.starts_with(&package) || package.starts_with(&out) {
            return Err(StepError::invalid_input(format!(
                "staging folder '{}' overlaps the package directory '{}'",
                out_folder, package_dir
            )));
        }
        if let Some(name) = ctx
            .top_level_files()
            .into_iter()
            .find(|name| normalized(name).starts_with(&out))
        {
            return Err(StepError::invalid_input(format!(
                "staging folder '{}' contains source file '{}'",
                out_folder, name
            )));
        }

        // Nothing under `out` is touched until every source exists.
        for name in ctx.top_level_files() {
            let path = ctx.root().join(&name);
            if !path.is_file() {
                return Err(StepError::file_not_found(path.display().to_string()));
            }
        }
        let package_path = ctx.package_dir();
        if !package_path.is_dir() {
            return Err(StepError::file_not_found(package_path.display().to_string()));
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut BuildState) -> StepResult<StepOutcome> {
        let metadata = state
            .metadata
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("metadata not resolved"))?;

        let out_dir = ctx.out_dir();
        if out_dir.exists() {
            ctx.logger
                .debug(&format!("Removing previous {}", out_dir.display()));
            fs::remove_dir_all(&out_dir)
                .map_err(|e| StepError::io_error("clean staging folder", e))?;
        }

        let staging_root = out_dir.join(&metadata.folder_id);
        fs::create_dir_all(&staging_root)
            .map_err(|e| StepError::io_error("create staging folder", e))?;

        for name in ctx.top_level_files() {
            let from = ctx.root().join(&name);
            let file_name = Path::new(&name)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&name));
            fs::copy(&from, staging_root.join(&file_name))
                .map_err(|e| StepError::io_error(format!("copy {}", name), e))?;
            ctx.logger.file_line(&format!("+ {}", file_name.display()));
        }

        let package_name = &ctx.settings.paths.package_dir;
        let summary = copy_tree(&ctx.package_dir(), &staging_root.join(package_name), &ctx.exclude)
            .map_err(|e| StepError::io_error(format!("copy {}", package_name), e))?;
        for rel in &summary.copied {
            ctx.logger
                .file_line(&format!("+ {}", Path::new(package_name).join(rel).display()));
        }
        for rel in &summary.skipped {
            ctx.logger
                .file_line(&format!("- {}", Path::new(package_name).join(rel).display()));
        }

        let files = list_files(&staging_root).map_err(|e| StepError::io_error("list staging", e))?;
        ctx.logger.info(&format!(
            "Staged {} files into {} ({} excluded)",
            files.len(),
            staging_root.display(),
            summary.skipped.len()
        ));

        state.staging = Some(StageOutput {
            out_dir,
            staging_root,
            files,
            skipped: summary.skipped,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &BuildState) -> StepResult<()> {
        let staging = state
            .staging
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("staging not recorded"))?;

        if !staging.staging_root.is_dir() {
            return Err(StepError::invalid_output(format!(
                "{} was not created",
                staging.staging_root.display()
            )));
        }
        if let Some(bad) = staging.files.iter().find(|f| ctx.exclude.matches_path(f)) {
            return Err(StepError::invalid_output(format!(
                "excluded file was staged: {}",
                bad.display()
            )));
        }
        Ok(())
    }
}

fn is_single_component(name: &str) -> bool {
    is_safe_relative_dir(name) && Path::new(name).components().count() == 1
}

/// Relative path with `.` components dropped.
fn normalized(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}
