//! Batch runner: validates a request, then processes files one at a time.
//!
//! Parameter and folder problems abort the run before any file is touched.
//! Per-file problems are logged and recorded; the run continues with the
//! next file and progress always advances.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::command::{prepare_output_path, CommandBuilder};
use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{JobInput, JobParameters, MediaFile, OperationMode, SpliceCandidate};
use crate::orchestrator::{run_splice_job, Context, PipelineError, PipelineResult, StepError};
use crate::probe::ProbeService;
use crate::process::CommandExecutor;

use super::discovery::{discover_media, splice_candidates, validate_folder};
use super::errors::{BatchError, BatchResult};
use super::progress::ProgressHandle;

/// What the front end asks for.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub folder: PathBuf,
    pub mode: OperationMode,
    pub input: JobInput,
}

impl BatchRequest {
    pub fn new(folder: impl Into<PathBuf>, mode: OperationMode, input: JobInput) -> Self {
        Self {
            folder: folder.into(),
            mode,
            input,
        }
    }
}

/// One file that did not produce an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// File name of the input.
    pub file: String,
    /// Stage that failed.
    pub step: Option<String>,
    /// Full diagnostic.
    pub message: String,
}

/// Terminal result of a run that got past its preconditions.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub mode: OperationMode,
    pub folder: PathBuf,
    /// Files attempted.
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FileFailure>,
    /// Outputs written, in processing order.
    pub outputs: Vec<PathBuf>,
}

impl BatchSummary {
    /// Whether every file succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Work item for one file.
#[derive(Debug, Clone)]
enum FileJob {
    Transform(MediaFile),
    Splice(SpliceCandidate),
}

impl FileJob {
    fn file_name(&self) -> &str {
        match self {
            Self::Transform(file) => &file.file_name,
            Self::Splice(candidate) => &candidate.original.file_name,
        }
    }
}

/// Validated request, ready to run.
struct BatchPlan {
    params: JobParameters,
    jobs: Vec<FileJob>,
}

/// Runs one batch synchronously on the calling thread.
pub struct BatchRunner {
    settings: Settings,
    executor: Arc<dyn CommandExecutor>,
    logger: Arc<RunLogger>,
    progress: ProgressHandle,
}

impl BatchRunner {
    pub fn new(
        settings: Settings,
        executor: Arc<dyn CommandExecutor>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            settings,
            executor,
            logger,
            progress: ProgressHandle::new(),
        }
    }

    /// Report progress through an existing handle.
    pub fn with_progress(mut self, progress: ProgressHandle) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    /// Run the whole batch.
    ///
    /// Returns `Err` only for batch-fatal preconditions; file failures are
    /// part of the summary.
    pub fn run(&self, request: &BatchRequest) -> BatchResult<BatchSummary> {
        self.logger.phase(&format!(
            "{} on {}",
            request.mode,
            request.folder.display()
        ));
        self.progress.set_status("Validating");

        let plan = match self.prepare(request) {
            Ok(plan) => plan,
            Err(e) => {
                self.logger.error(&e.to_string());
                tracing::error!("Batch aborted: {}", e);
                self.progress.fail(e.to_string());
                return Err(e);
            }
        };

        let total = plan.jobs.len();
        self.logger.info(&format!("{} file(s) to process", total));
        if self.logger.wants_command_json() {
            self.logger.log_args_json(&plan.params.encoder_args);
        }
        self.progress.begin(total);

        let mut summary = BatchSummary {
            mode: request.mode,
            folder: request.folder.clone(),
            total,
            succeeded: 0,
            failures: Vec::new(),
            outputs: Vec::new(),
        };

        for (i, job) in plan.jobs.iter().enumerate() {
            let name = job.file_name();
            tracing::info!("Processing file {}/{}: {}", i + 1, total, name);
            self.logger
                .section(&format!("[{}/{}] {}", i + 1, total, name));
            self.progress.start_file(name);

            match self.process(request.mode, &plan.params, job) {
                Ok(output) => {
                    self.logger
                        .success(&format!("{} -> {}", name, output.display()));
                    summary.succeeded += 1;
                    summary.outputs.push(output);
                }
                Err(e) => {
                    self.logger.error(&format!("{} failed: {}", name, e));
                    tracing::warn!("File {} failed: {}", name, e);
                    summary.failures.push(FileFailure {
                        file: name.to_string(),
                        step: e.step_name().map(str::to_string),
                        message: e.to_string(),
                    });
                }
            }

            self.progress.finish_file();
        }

        let status = format!(
            "Completed: {} succeeded, {} failed",
            summary.succeeded,
            summary.failures.len()
        );
        self.logger.phase(&status);
        self.logger.flush();
        self.progress.complete(status);

        Ok(summary)
    }

    /// Validate parameters and folder, then discover the files to process.
    fn prepare(&self, request: &BatchRequest) -> BatchResult<BatchPlan> {
        let mut params = JobParameters::from_input(request.mode, &request.input)?;
        if params.encoder_args.is_empty() {
            params = params.with_encoder_args(&self.settings.encoding.default_args);
            self.logger.info(&format!(
                "Using default encoder arguments: {}",
                self.settings.encoding.default_args
            ));
        }
        if request.input.window_seconds.is_some()
            && params.effective_window(request.mode).is_none()
        {
            self.logger
                .warn("Trailing window ignored (only used by trailer removal with regions)");
        }

        validate_folder(&request.folder)?;
        let files = discover_media(&request.folder)?;
        if files.is_empty() {
            return Err(BatchError::NoMediaFiles(request.folder.clone()));
        }
        self.logger
            .validation(&format!("{} media file(s) found", files.len()));

        let jobs = if request.mode.is_splice() {
            let suffix = &self.settings.splice.companion_suffix;
            let candidates = splice_candidates(&files, suffix);
            if !candidates.iter().any(|c| c.companion_present) {
                return Err(BatchError::NoPairedFiles {
                    folder: request.folder.clone(),
                    suffix: suffix.clone(),
                });
            }
            candidates.into_iter().map(FileJob::Splice).collect()
        } else {
            files.into_iter().map(FileJob::Transform).collect()
        };

        Ok(BatchPlan { params, jobs })
    }

    fn process(
        &self,
        mode: OperationMode,
        params: &JobParameters,
        job: &FileJob,
    ) -> PipelineResult<PathBuf> {
        match job {
            FileJob::Transform(file) => self.transform(mode, params, file),
            FileJob::Splice(candidate) => self.splice(mode, params, candidate),
        }
    }

    /// Compress / mask one file with a single encoder invocation.
    fn transform(
        &self,
        mode: OperationMode,
        params: &JobParameters,
        file: &MediaFile,
    ) -> PipelineResult<PathBuf> {
        let job = file.file_name.as_str();

        let output = prepare_output_path(file, mode, &self.settings)
            .map_err(step_failed(job, "PrepareOutput"))?;

        let duration = if params.needs_probe(mode) {
            let probe = ProbeService::new(&self.settings.tools.ffprobe);
            Some(
                probe
                    .duration(self.executor.as_ref(), &file.path, &self.logger)
                    .map_err(step_failed(job, "ProbeDuration"))?,
            )
        } else {
            None
        };

        let command = CommandBuilder::new(&self.settings.tools.ffmpeg)
            .transform(mode, params, &file.path, &output, duration)
            .map_err(step_failed(job, "BuildCommand"))?;
        self.executor
            .run(&command, &self.logger)
            .map_err(step_failed(job, "Encode"))?;

        Ok(output)
    }

    /// Run the splice pipeline for one original.
    fn splice(
        &self,
        mode: OperationMode,
        params: &JobParameters,
        candidate: &SpliceCandidate,
    ) -> PipelineResult<PathBuf> {
        let job = candidate.original.file_name.as_str();
        let splice = params
            .splice
            .ok_or_else(|| PipelineError::validation_failed(job, "no splice configuration"))?;

        let Some(pair) = candidate.clone().into_pair() else {
            return Err(PipelineError::step_failed(
                job,
                "PairCompanion",
                StepError::missing_companion(&candidate.companion),
            ));
        };

        let output = prepare_output_path(&pair.original, mode, &self.settings)
            .map_err(step_failed(job, "PrepareOutput"))?;

        let ctx = Context::new(
            pair,
            splice,
            self.settings.clone(),
            output,
            Arc::clone(&self.logger),
            Arc::clone(&self.executor),
        )
        .with_encoder_args(params.encoder_args.clone())
        .with_progress_callback(Box::new(|step: &str, percent: u32, _message: &str| {
            tracing::debug!(step, percent, "Splice progress");
        }));

        run_splice_job(&ctx).map(|result| result.output_path)
    }
}

/// Wrap a step error with the file and stage it came from.
fn step_failed<'a>(job: &'a str, step: &'a str) -> impl FnOnce(StepError) -> PipelineError + 'a {
    move |e| PipelineError::step_failed(job, step, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{feed_logger, ScriptedExecutor};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Harness {
        folder: TempDir,
        temp: TempDir,
        executor: Arc<ScriptedExecutor>,
        runner: BatchRunner,
        feed: crate::logging::LogFeed,
    }

    fn harness(executor: ScriptedExecutor, files: &[&str]) -> Harness {
        crate::logging::init_test_tracing();
        let folder = tempdir().unwrap();
        for name in files {
            fs::write(folder.path().join(name), b"x").unwrap();
        }
        let temp = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.temp_root = temp.path().to_string_lossy().to_string();

        let executor = Arc::new(executor);
        let (logger, feed) = feed_logger("batch-test");
        let dyn_executor: Arc<dyn CommandExecutor> = executor.clone();
        let runner = BatchRunner::new(settings, dyn_executor, logger);

        Harness {
            folder,
            temp,
            executor,
            runner,
            feed,
        }
    }

    fn request(folder: impl Into<PathBuf>, mode: OperationMode, input: JobInput) -> BatchRequest {
        BatchRequest::new(folder, mode, input)
    }

    fn error_lines(feed: &crate::logging::LogFeed) -> Vec<String> {
        feed.drain()
            .into_iter()
            .filter(|l| l.contains("[ERROR]"))
            .collect()
    }

    fn output_contains(command: &crate::command::ToolCommand, needle: &str) -> bool {
        command
            .last_arg()
            .is_some_and(|a| a.to_string_lossy().contains(needle))
    }

    #[test]
    fn one_failing_file_does_not_stop_the_batch() {
        let executor = ScriptedExecutor::new().fail_when(|c| output_contains(c, "b_c."));
        let h = harness(executor, &["a.mp4", "b.mp4", "c.mp4"]);

        let summary = h
            .runner
            .run(&request(h.folder.path(), OperationMode::Compress, JobInput::default()))
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].file, "b.mp4");
        assert_eq!(summary.failures[0].step.as_deref(), Some("Encode"));
        assert_eq!(h.executor.commands().len(), 3);

        let progress = h.runner.progress().snapshot();
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.total, 3);
        assert!(progress.finished);
        assert!(!progress.failed);

        let errors = error_lines(&h.feed);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(errors[0].contains("b.mp4 failed"));
    }

    #[test]
    fn failed_splice_is_reported_once() {
        let executor = ScriptedExecutor::new()
            .with_duration(10.0)
            .fail_when(|c| output_contains(c, "spliced_b."));
        let h = harness(
            executor,
            &["a.mp4", "a_no_sub.mp4", "b.mp4", "b_no_sub.mp4", "c.mp4", "c_no_sub.mp4"],
        );
        let input = JobInput {
            head_seconds: Some("2".to_string()),
            tail_seconds: Some("3".to_string()),
            ..Default::default()
        };
        let summary = h
            .runner
            .run(&request(h.folder.path(), OperationMode::SpliceAdvanced, input))
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].step.as_deref(), Some("RemuxWithAudio"));

        let errors = error_lines(&h.feed);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(errors[0].contains("b.mp4 failed"));
        assert_eq!(fs::read_dir(h.temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn compress_falls_back_to_default_args() {
        let h = harness(ScriptedExecutor::new(), &["clip.mp4"]);
        let summary = h
            .runner
            .run(&request(h.folder.path(), OperationMode::Compress, JobInput::default()))
            .unwrap();

        assert_eq!(summary.outputs, vec![h.folder.path().join("clip_c.mp4")]);
        let commands = h.executor.commands();
        let command = &commands[0];
        assert_eq!(command.value_after("-c:v").unwrap(), "libx264");
        assert!(!command.has_arg("-vf"));
    }

    #[test]
    fn trailer_window_probes_and_windows_last_region() {
        let h = harness(ScriptedExecutor::new().with_duration(10.0), &["clip.mkv"]);
        let input = JobInput {
            encoder_args: "-c:v libx264 -y".to_string(),
            regions: Some("1,2,3,4&5,6,7,8".to_string()),
            window_seconds: Some("2.2".to_string()),
            ..Default::default()
        };
        h.runner
            .run(&request(h.folder.path(), OperationMode::RemoveTrailer, input))
            .unwrap();

        let commands = h.executor.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].tool_name(), "ffprobe");
        let graph = commands[1].value_after("-vf").unwrap().to_string_lossy().to_string();
        assert_eq!(
            graph,
            "delogo=x=1:y=2:w=3:h=4,delogo=x=5:y=6:w=7:h=8:enable='between(t,7.800,10.000)'"
        );
        assert_eq!(
            commands[1].last_arg().unwrap(),
            h.folder.path().join("clip_w.mkv").as_os_str()
        );
    }

    #[test]
    fn probe_failure_is_a_file_error() {
        let executor = ScriptedExecutor::new().fail_when(|c| c.tool_name() == "ffprobe");
        let h = harness(executor, &["clip.mp4"]);
        let input = JobInput {
            regions: Some("1,2,3,4".to_string()),
            window_seconds: Some("2".to_string()),
            ..Default::default()
        };
        let summary = h
            .runner
            .run(&request(h.folder.path(), OperationMode::RemoveTrailer, input))
            .unwrap();
        assert_eq!(summary.failures[0].step.as_deref(), Some("ProbeDuration"));
    }

    #[test]
    fn bad_parameters_abort_before_any_file() {
        let h = harness(ScriptedExecutor::new(), &["clip.mp4"]);
        let input = JobInput {
            regions: Some("1,2,3".to_string()),
            ..Default::default()
        };
        let err = h
            .runner
            .run(&request(h.folder.path(), OperationMode::RemoveSubtitle, input))
            .unwrap_err();

        assert!(matches!(err, BatchError::InvalidParameters(_)));
        assert!(h.executor.commands().is_empty());
        let progress = h.runner.progress().snapshot();
        assert!(progress.failed);
        assert_eq!(progress.completed, 0);
    }

    #[test]
    fn folder_preconditions_abort() {
        let h = harness(ScriptedExecutor::new(), &[]);
        let err = h
            .runner
            .run(&request(h.folder.path(), OperationMode::Compress, JobInput::default()))
            .unwrap_err();
        assert!(matches!(err, BatchError::EmptyFolder(_)));

        fs::write(h.folder.path().join("notes.txt"), b"x").unwrap();
        let err = h
            .runner
            .run(&request(h.folder.path(), OperationMode::Compress, JobInput::default()))
            .unwrap_err();
        assert!(matches!(err, BatchError::NoMediaFiles(_)));

        let err = h
            .runner
            .run(&request(
                h.folder.path().join("missing"),
                OperationMode::Compress,
                JobInput::default(),
            ))
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidFolder(_)));
        assert!(h.executor.commands().is_empty());
    }

    #[test]
    fn splice_reports_missing_companion_per_file() {
        let h = harness(
            ScriptedExecutor::new().with_duration(10.0),
            &["a.mp4", "a_no_sub.mp4", "b.mp4"],
        );
        let input = JobInput {
            head_seconds: Some("2".to_string()),
            tail_seconds: Some("3".to_string()),
            ..Default::default()
        };
        let summary = h
            .runner
            .run(&request(h.folder.path(), OperationMode::SpliceAdvanced, input))
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(
            summary.outputs,
            vec![h.folder.path().join("OK").join("spliced_a.mp4")]
        );
        assert_eq!(summary.failures[0].file, "b.mp4");
        assert_eq!(summary.failures[0].step.as_deref(), Some("PairCompanion"));
        assert!(summary.failures[0].message.contains("b_no_sub.mp4"));

        assert_eq!(fs::read_dir(h.temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn splice_without_any_pair_aborts() {
        let h = harness(ScriptedExecutor::new(), &["b.mp4"]);
        let input = JobInput {
            head_seconds: Some("2".to_string()),
            ..Default::default()
        };
        let err = h
            .runner
            .run(&request(h.folder.path(), OperationMode::SpliceAdvanced, input))
            .unwrap_err();
        assert!(matches!(err, BatchError::NoPairedFiles { .. }));
    }
}
