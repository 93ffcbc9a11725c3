//! Core types for the splice pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command::{CommandBuilder, ToolCommand};
use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{PairedMediaFile, SpliceConfig};
use crate::probe::ProbeService;
use crate::process::CommandExecutor;

use super::errors::StepResult;
use super::temp::TempScope;
use super::timeline::SpliceTimeline;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the job configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `SpliceState`.
pub struct Context {
    /// Job name (the original's file name).
    pub job_name: String,
    /// Original and companion.
    pub pair: PairedMediaFile,
    /// Requested head/tail.
    pub splice: SpliceConfig,
    /// Application settings.
    pub settings: Settings,
    /// Encoder arguments for the re-encoded segments.
    pub encoder_args: Vec<String>,
    /// Final output file.
    pub output_path: PathBuf,
    /// Run logger.
    pub logger: Arc<RunLogger>,
    /// Runs external commands.
    pub executor: Arc<dyn CommandExecutor>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        pair: PairedMediaFile,
        splice: SpliceConfig,
        settings: Settings,
        output_path: PathBuf,
        logger: Arc<RunLogger>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            job_name: pair.original.file_name.clone(),
            pair,
            splice,
            settings,
            encoder_args: Vec::new(),
            output_path,
            logger,
            executor,
            progress_callback: None,
        }
    }

    /// Set the encoder arguments used for segments.
    pub fn with_encoder_args(mut self, args: Vec<String>) -> Self {
        self.encoder_args = args;
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    pub fn original(&self) -> &Path {
        &self.pair.original.path
    }

    pub fn companion(&self) -> &Path {
        &self.pair.companion
    }

    /// Extension used for video intermediates (same container as the original).
    pub fn video_extension(&self) -> &str {
        &self.pair.original.extension
    }

    pub fn commands(&self) -> CommandBuilder {
        CommandBuilder::new(&self.settings.tools.ffmpeg)
    }

    pub fn probe(&self) -> ProbeService {
        ProbeService::new(&self.settings.tools.ffprobe)
    }

    /// Run a command through the executor.
    pub fn run(&self, command: &ToolCommand) -> StepResult<()> {
        self.executor.run(command, &self.logger)
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Steps add their outputs; they do not overwrite earlier ones. The temp
/// scope owns every intermediate path recorded here.
#[derive(Debug)]
pub struct SpliceState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: String,
    /// Probed duration of the original.
    pub duration: Option<f64>,
    /// Clamped cut points.
    pub timeline: Option<SpliceTimeline>,
    /// Extracted audio track.
    pub audio: Option<PathBuf>,
    /// Original head segment.
    pub head: Option<PathBuf>,
    /// Companion middle segment.
    pub middle: Option<PathBuf>,
    /// Original tail segment.
    pub tail: Option<PathBuf>,
    /// Concat manifest.
    pub manifest: Option<PathBuf>,
    /// Concatenated video without audio.
    pub merged: Option<PathBuf>,
    /// Final output (set by the remux step).
    pub output: Option<PathBuf>,
    /// Owner of all temporary files.
    pub temps: TempScope,
}

impl SpliceState {
    /// Create a new state with the given ID and temp scope.
    pub fn new(job_id: impl Into<String>, temps: TempScope) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: chrono::Local::now().to_rfc3339(),
            duration: None,
            timeline: None,
            audio: None,
            head: None,
            middle: None,
            tail: None,
            manifest: None,
            merged: None,
            output: None,
            temps,
        }
    }

    /// Built segments in playback order (head, middle, tail).
    pub fn segments(&self) -> Vec<&Path> {
        [&self.head, &self.middle, &self.tail]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect()
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (nothing to do, but not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_in_playback_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = SpliceState::new("job", TempScope::new(dir.path(), "clip.mp4"));
        assert!(state.segments().is_empty());

        state.tail = Some(PathBuf::from("t.mp4"));
        state.head = Some(PathBuf::from("h.mp4"));
        assert_eq!(
            state.segments(),
            vec![Path::new("h.mp4"), Path::new("t.mp4")]
        );

        state.middle = Some(PathBuf::from("m.mp4"));
        assert_eq!(
            state.segments(),
            vec![Path::new("h.mp4"), Path::new("m.mp4"), Path::new("t.mp4")]
        );
    }
}
