//! Error types for per-file processing.
//!
//! Errors carry context that chains through layers:
//! File → Step → Operation → Detail

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Per-file error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("'{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Input validation failed before the pipeline started.
    #[error("'{job_name}' failed validation: {message}")]
    ValidationFailed { job_name: String, message: String },

    /// Failed to set up the job (output directory, temp root).
    #[error("'{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Name of the step that failed, if any.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::StepFailed { step_name, .. } => Some(step_name),
            _ => None,
        }
    }

    /// The underlying step error, if any.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::StepFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error from a single step or external command.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// Splice original without its `_no_sub` companion.
    #[error("Missing companion file: {}", path.display())]
    MissingCompanionFile { path: PathBuf },

    /// Duration could not be determined.
    #[error("Could not probe duration of {}: {reason}", path.display())]
    ProbeFailure { path: PathBuf, reason: String },

    /// An external tool exited unsuccessfully (-1 when killed by a signal).
    #[error("{tool} failed with exit code {exit_code}{}", fmt_detail(.message))]
    ExternalToolFailure {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error, including failure to spawn a tool.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

fn fmt_detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
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

    /// Create a missing companion error.
    pub fn missing_companion(path: impl Into<PathBuf>) -> Self {
        Self::MissingCompanionFile { path: path.into() }
    }

    /// Create a probe failure.
    pub fn probe_failure(path: &Path, reason: impl Into<String>) -> Self {
        Self::ProbeFailure {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an external tool failure.
    pub fn tool_failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Fail with `InvalidInput` unless `path` is an existing file.
pub fn require_input(path: &Path, what: &str) -> StepResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StepError::invalid_input(format!(
            "{} not found: {}",
            what,
            path.display()
        )))
    }
}

/// Fail with `InvalidOutput` unless `path` is an existing file.
pub fn require_output(path: &Path, what: &str) -> StepResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StepError::invalid_output(format!(
            "{} was not created: {}",
            what,
            path.display()
        )))
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for per-file pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
