//! Archive step: zip the staging folder and digest the result.

use std::fs;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{ArchiveOutput, BuildState, Context, StepOutcome};
use crate::package::archive::{sha256_file, write_zip};

/// Writes `<root>/<id-with-dashes>-v<version>.zip` and its SHA-256.
pub struct ArchiveStep;

impl ArchiveStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArchiveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ArchiveStep {
    fn name(&self) -> &str {
        "Archive"
    }

    fn description(&self) -> &str {
        "Compress the staging folder into a versioned zip"
    }

    fn validate_input(&self, _ctx: &Context, state: &BuildState) -> StepResult<()> {
        if !state.has_metadata() {
            return Err(StepError::precondition_failed("metadata not resolved"));
        }
        if !state.has_staging() {
            return Err(StepError::precondition_failed("nothing staged"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut BuildState) -> StepResult<StepOutcome> {
        let (metadata, staging) = match (state.metadata.as_ref(), state.staging.as_ref()) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(StepError::precondition_failed("nothing staged")),
        };

        let archive_name = metadata.archive_file_name();
        let archive_path = ctx.root().join(&archive_name);
        if archive_path.exists() {
            ctx.logger
                .debug(&format!("Replacing existing {}", archive_name));
            fs::remove_file(&archive_path)
                .map_err(|e| StepError::io_error("remove previous archive", e))?;
        }

        let entries = write_zip(
            &staging.out_dir,
            &staging.staging_root,
            &archive_path,
            ctx.settings.package.compression_level,
        )
        .map_err(|e| StepError::archive_error(format!("write {}", archive_name), e))?;
        for name in &entries {
            ctx.logger.file_line(&format!("zip {}", name));
        }

        let sha256 =
            sha256_file(&archive_path).map_err(|e| StepError::io_error("hash archive", e))?;
        let size_bytes = fs::metadata(&archive_path)
            .map_err(|e| StepError::io_error("stat archive", e))?
            .len();

        ctx.logger.info(&format!(
            "Wrote {} ({} entries, {} bytes)",
            archive_name,
            entries.len(),
            size_bytes
        ));

        state.archive = Some(ArchiveOutput {
            archive_path,
            archive_name,
            sha256,
            size_bytes,
            entries,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &BuildState) -> StepResult<()> {
        let archive = state
            .archive
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("archive not recorded"))?;

        match fs::metadata(&archive.archive_path) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(StepError::invalid_output(format!(
                "{} is empty",
                archive.archive_name
            ))),
            Err(_) => Err(StepError::invalid_output(format!(
                "{} was not written",
                archive.archive_name
            ))),
        }
    }
}
