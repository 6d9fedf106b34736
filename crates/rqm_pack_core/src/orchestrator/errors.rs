//! Error types for the build pipeline.
//!
//! Errors carry context that chains through layers:
//! Build → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::metadata::MetadataError;

/// Top-level pipeline error with build context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Build '{build_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        build_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Pipeline was cancelled.
    #[error("Build '{build_name}' was cancelled")]
    Cancelled { build_name: String },

    /// Failed to set up the build (logger, patterns).
    #[error("Build '{build_name}' setup failed: {message}")]
    SetupFailed { build_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        build_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            build_name: build_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(build_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            build_name: build_name.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(build_name: impl Into<String>) -> Self {
        Self::Cancelled {
            build_name: build_name.into(),
        }
    }

    /// The step error underneath, if any.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::StepFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// Manifest or version marker could not be read.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Two version sources disagree.
    #[error("Version mismatch: requested {requested} but {source_name} has {found}")]
    VersionMismatch {
        requested: String,
        found: String,
        source_name: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Zip writing failed.
    #[error("Archive error in {operation}: {source}")]
    ArchiveError {
        operation: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a version mismatch error.
    pub fn version_mismatch(
        requested: impl Into<String>,
        found: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self::VersionMismatch {
            requested: requested.into(),
            found: found.into(),
            source_name: source_name.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create an archive error with context.
    pub fn archive_error(operation: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::ArchiveError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
