//! Build pipeline for packaging the extension.
//!
//! A build is a sequence of steps that validate, execute, and record
//! their results in a shared `BuildState`.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Resolve   (manifest + __init__ versions, read-only)
//!     ├── Step: Stage     (<out>/<id>/ without caches)
//!     └── Step: Archive   (<id-with-dashes>-v<version>.zip + SHA-256)
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{ArchiveStep, ResolveStep, StageStep};
pub use types::{
    ArchiveOutput, BuildState, Context, ProgressCallback, ResolvedMetadata, StageOutput,
    StepOutcome,
};

/// Create the standard build pipeline: Resolve, Stage, Archive.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ResolveStep::new())
        .with_step(StageStep::new())
        .with_step(ArchiveStep::new())
}
