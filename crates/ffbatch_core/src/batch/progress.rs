//! Shared batch progress.
//!
//! Only the batch runner mutates progress; the front end reads snapshots.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

/// Point-in-time view of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// Files scheduled.
    pub total: usize,
    /// Files attempted so far (success or failure).
    pub completed: usize,
    /// File being processed.
    pub current_file: Option<String>,
    /// Short status line.
    pub status: String,
    /// Run reached a terminal state.
    pub finished: bool,
    /// Run stopped on a batch-fatal error.
    pub failed: bool,
}

impl BatchProgress {
    /// Completion in percent (0 when nothing is scheduled).
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

/// Cloneable handle to the progress of one run.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<RwLock<BatchProgress>>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current progress.
    pub fn snapshot(&self) -> BatchProgress {
        self.inner.read().clone()
    }

    pub(crate) fn set_status(&self, status: impl Into<String>) {
        self.inner.write().status = status.into();
    }

    pub(crate) fn begin(&self, total: usize) {
        let mut p = self.inner.write();
        p.total = total;
        p.completed = 0;
        p.current_file = None;
        p.finished = false;
        p.failed = false;
        p.status = format!("0/{}", total);
    }

    pub(crate) fn start_file(&self, name: &str) {
        let mut p = self.inner.write();
        p.current_file = Some(name.to_string());
        p.status = format!("{}/{} {}", p.completed + 1, p.total, name);
    }

    pub(crate) fn finish_file(&self) {
        let mut p = self.inner.write();
        p.completed = (p.completed + 1).min(p.total);
        p.current_file = None;
        p.status = format!("{}/{}", p.completed, p.total);
    }

    pub(crate) fn complete(&self, status: impl Into<String>) {
        let mut p = self.inner.write();
        p.current_file = None;
        p.finished = true;
        p.status = status.into();
    }

    pub(crate) fn fail(&self, status: impl Into<String>) {
        let mut p = self.inner.write();
        p.current_file = None;
        p.finished = true;
        p.failed = true;
        p.status = status.into();
    }
}
