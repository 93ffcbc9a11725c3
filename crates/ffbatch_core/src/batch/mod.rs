//! Batch execution.
//!
//! [`BatchRunner`] validates a [`BatchRequest`] and processes every file of
//! the folder sequentially. [`BatchSession`] runs it on a worker thread and
//! hands the front end a [`BatchHandle`] to poll the log feed and progress.

mod discovery;
mod errors;
mod progress;
mod runner;
mod session;

pub use discovery::{discover_media, splice_candidates, validate_folder};
pub use errors::{BatchError, BatchResult};
pub use progress::{BatchProgress, ProgressHandle};
pub use runner::{BatchRequest, BatchRunner, BatchSummary, FileFailure};
pub use session::{BatchHandle, BatchSession};
