//! Temporary artifact lifecycle for one splice job.
//!
//! Every intermediate file is allocated through a [`TempScope`]. Releasing
//! the scope deletes everything it registered; deletion problems are logged
//! and never turned into errors. A scope dropped without being released
//! cleans up on drop.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;

use crate::logging::{sanitize_filename, RunLogger};

use super::errors::{StepError, StepResult};

/// Process-wide counter so scopes created in the same millisecond differ.
static SCOPE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One registered intermediate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempArtifact {
    pub path: PathBuf,
    /// Pipeline stage that produced it (`audio`, `head`, `merged`, ...).
    pub stage: String,
}

/// Outcome of releasing a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files deleted.
    pub removed: usize,
    /// Files that were registered but never created.
    pub absent: usize,
    /// Files that could not be deleted.
    pub failed: Vec<PathBuf>,
}

/// Owner of a job's temporary files.
#[derive(Debug)]
pub struct TempScope {
    root: PathBuf,
    token: String,
    next_seq: u32,
    artifacts: Vec<TempArtifact>,
}

impl TempScope {
    /// Create a scope placing files under `root`.
    ///
    /// `label` (usually the job name) is part of every file name together
    /// with a timestamp and sequence numbers.
    pub fn new(root: impl Into<PathBuf>, label: &str) -> Self {
        let counter = SCOPE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let stem = Path::new(label)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "job".to_string());
        let token = format!(
            "{}_{}_{}",
            sanitize_filename(&stem).replace(' ', "_"),
            Local::now().format("%Y%m%d%H%M%S%3f"),
            counter
        );

        Self {
            root: root.into(),
            token,
            next_seq: 0,
            artifacts: Vec::new(),
        }
    }

    /// Directory temp files are placed in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a fresh path for `stage` and register it for deletion.
    ///
    /// Creates the root directory if needed; the file itself is not created.
    pub fn allocate(&mut self, stage: &str, extension: &str) -> StepResult<PathBuf> {
        fs::create_dir_all(&self.root)
            .map_err(|e| StepError::io_error("creating temp directory", e))?;

        self.next_seq += 1;
        let name = if extension.is_empty() {
            format!("{}_{:02}_{}", self.token, self.next_seq, stage)
        } else {
            format!("{}_{:02}_{}.{}", self.token, self.next_seq, stage, extension)
        };
        let path = self.root.join(name);
        self.register(path.clone(), stage);
        Ok(path)
    }

    /// Register an externally created file for deletion.
    pub fn register(&mut self, path: impl Into<PathBuf>, stage: &str) {
        self.artifacts.push(TempArtifact {
            path: path.into(),
            stage: stage.to_string(),
        });
    }

    /// Registered artifacts in allocation order.
    pub fn artifacts(&self) -> &[TempArtifact] {
        &self.artifacts
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Delete every registered artifact and forget them.
    pub fn release(&mut self, logger: Option<&RunLogger>) -> CleanupReport {
        let mut report = CleanupReport::default();

        for artifact in self.artifacts.drain(..) {
            match fs::remove_file(&artifact.path) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => report.absent += 1,
                Err(e) => {
                    let msg = format!(
                        "Could not delete temp file {} ({}): {}",
                        artifact.path.display(),
                        artifact.stage,
                        e
                    );
                    match logger {
                        Some(logger) => logger.warn(&msg),
                        None => tracing::warn!("{}", msg),
                    }
                    report.failed.push(artifact.path);
                }
            }
        }

        report
    }
}

impl Drop for TempScope {
    fn drop(&mut self) {
        if !self.artifacts.is_empty() {
            self.release(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn allocations_are_unique_and_registered() {
        let dir = tempdir().unwrap();
        let mut scope = TempScope::new(dir.path(), "ep 1.mkv");

        let a = scope.allocate("audio", "m4a").unwrap();
        let b = scope.allocate("head", "mkv").unwrap();
        assert_ne!(a, b);
        assert!(a.to_string_lossy().ends_with("_01_audio.m4a"));
        assert!(b.file_name().unwrap().to_string_lossy().starts_with("ep_1_"));
        assert_eq!(scope.artifacts().len(), 2);
        assert_eq!(scope.artifacts()[1].stage, "head");
    }

    #[test]
    fn scopes_with_same_label_do_not_collide() {
        let dir = tempdir().unwrap();
        let mut first = TempScope::new(dir.path(), "clip.mp4");
        let mut second = TempScope::new(dir.path(), "clip.mp4");
        assert_ne!(
            first.allocate("audio", "m4a").unwrap(),
            second.allocate("audio", "m4a").unwrap()
        );
    }

    #[test]
    fn release_deletes_created_files() {
        let dir = tempdir().unwrap();
        let mut scope = TempScope::new(dir.path(), "clip.mp4");

        let created = scope.allocate("head", "mp4").unwrap();
        fs::write(&created, b"x").unwrap();
        let _never_created = scope.allocate("tail", "mp4").unwrap();

        let report = scope.release(None);
        assert_eq!(report.removed, 1);
        assert_eq!(report.absent, 1);
        assert!(report.failed.is_empty());
        assert!(!created.exists());
        assert!(scope.is_empty());
    }

    #[test]
    fn drop_cleans_up_unreleased_scope() {
        let dir = tempdir().unwrap();
        let path = {
            let mut scope = TempScope::new(dir.path(), "clip.mp4");
            let path = scope.allocate("merged", "mp4").unwrap();
            fs::write(&path, b"x").unwrap();
            path
        };
        assert!(!path.exists());
    }
}
