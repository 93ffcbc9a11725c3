//! Batch-fatal errors.
//!
//! Anything here stops the run before the first file is processed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::ParameterError;

#[derive(Error, Debug)]
pub enum BatchError {
    /// Operator input did not validate.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    /// Folder missing or not a directory.
    #[error("Not a folder: {}", .0.display())]
    InvalidFolder(PathBuf),

    /// Folder contains no entries at all.
    #[error("Folder is empty: {}", .0.display())]
    EmptyFolder(PathBuf),

    /// Folder contains no recognised media file.
    #[error("No media files in {}", .0.display())]
    NoMediaFiles(PathBuf),

    /// Splice mode found no original with its companion.
    #[error("No original has a '{suffix}' companion in {}", folder.display())]
    NoPairedFiles { folder: PathBuf, suffix: String },

    /// A run is already in progress on this session.
    #[error("A batch is already running")]
    AlreadyRunning,

    /// Reading the folder or spawning the worker failed.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The worker thread panicked.
    #[error("Batch worker panicked")]
    WorkerPanicked,
}

impl BatchError {
    /// Create an I/O error.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type BatchResult<T> = Result<T, BatchError>;
