//! Background batch session.
//!
//! A session runs at most one batch at a time on a dedicated worker thread.
//! The front end keeps the returned [`BatchHandle`] and polls it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Local;

use crate::config::Settings;
use crate::logging::{log_channel, LogConfig, LogFeed, LogLevel, RunLogger};
use crate::process::CommandExecutor;

use super::errors::{BatchError, BatchResult};
use super::progress::{BatchProgress, ProgressHandle};
use super::runner::{BatchRequest, BatchRunner, BatchSummary};

/// Clears the running flag when the worker exits, panics included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts batches on a worker thread, one at a time.
pub struct BatchSession {
    settings: Settings,
    executor: Arc<dyn CommandExecutor>,
    log_dir: Option<PathBuf>,
    log_level: LogLevel,
    running: Arc<AtomicBool>,
}

impl BatchSession {
    pub fn new(settings: Settings, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            settings,
            executor,
            log_dir: None,
            log_level: LogLevel::Info,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Write run logs into `dir` (when enabled in `[logging]`).
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Whether a batch is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start `request` on a new worker thread.
    ///
    /// Fails with `AlreadyRunning` while a previous batch is still active.
    pub fn start(&self, request: BatchRequest) -> BatchResult<BatchHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BatchError::AlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        let (sender, feed) = log_channel();
        let mut config = LogConfig::from_settings(&self.settings.logging);
        config.level = self.log_level;

        let run_name = format!(
            "{}_{}",
            request.mode.cli_name(),
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let log_dir = self
            .log_dir
            .as_deref()
            .filter(|_| self.settings.logging.write_run_log);
        let logger = RunLogger::new(run_name, log_dir, config, Some(sender))
            .map_err(|e| BatchError::io("creating run log", e))?;
        if let Some(path) = logger.log_path() {
            tracing::info!("Run log: {}", path.display());
        }

        let progress = ProgressHandle::new();
        let runner = BatchRunner::new(
            self.settings.clone(),
            Arc::clone(&self.executor),
            Arc::new(logger),
        )
        .with_progress(progress.clone());

        let worker = thread::Builder::new()
            .name("ffbatch-worker".to_string())
            .spawn(move || {
                let _guard = guard;
                runner.run(&request)
            })
            .map_err(|e| BatchError::io("spawning batch worker", e))?;

        Ok(BatchHandle {
            feed,
            progress,
            worker,
        })
    }
}

/// Handle to a running batch.
pub struct BatchHandle {
    feed: LogFeed,
    progress: ProgressHandle,
    worker: JoinHandle<BatchResult<BatchSummary>>,
}

impl BatchHandle {
    /// Take all log lines produced since the last call.
    pub fn drain_log(&self) -> Vec<String> {
        self.feed.drain()
    }

    /// Current progress.
    pub fn progress(&self) -> BatchProgress {
        self.progress.snapshot()
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and return its result.
    ///
    /// Lines still pending in the feed remain available through the
    /// returned feed.
    pub fn join(self) -> (BatchResult<BatchSummary>, LogFeed) {
        let result = match self.worker.join() {
            Ok(result) => result,
            Err(_) => Err(BatchError::WorkerPanicked),
        };
        (result, self.feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ToolCommand;
    use crate::models::{JobInput, OperationMode};
    use crate::orchestrator::StepResult;
    use crate::testing::ScriptedExecutor;
    use parking_lot::Mutex;
    use std::fs;
    use std::sync::mpsc;
    use tempfile::tempdir;

    /// Blocks every command until the test releases it.
    struct GatedExecutor {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl CommandExecutor for GatedExecutor {
        fn run(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<()> {
            logger.command(&command.display());
            let _ = self.gate.lock().recv();
            Ok(())
        }

        fn capture(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<String> {
            self.run(command, logger)?;
            Ok("1.0".to_string())
        }
    }

    #[test]
    fn refuses_concurrent_runs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("clip.mp4"), b"x").unwrap();

        let (release, gate) = mpsc::channel();
        let executor = Arc::new(GatedExecutor {
            gate: Mutex::new(gate),
        });
        let session = BatchSession::new(Settings::default(), executor);
        let request = BatchRequest::new(dir.path(), OperationMode::Compress, JobInput::default());

        let handle = session.start(request.clone()).unwrap();
        assert!(session.is_running());
        assert!(matches!(
            session.start(request.clone()),
            Err(BatchError::AlreadyRunning)
        ));

        release.send(()).unwrap();
        let (result, _feed) = handle.join();
        assert_eq!(result.unwrap().succeeded, 1);
        assert!(!session.is_running());

        // Free again once the worker is gone.
        release.send(()).unwrap();
        let (result, _feed) = session.start(request).unwrap().join();
        assert!(result.is_ok());
    }

    #[test]
    fn feed_and_progress_reach_the_front_end() {
        let dir = tempdir().unwrap();
        for name in ["a.mp4", "b.mp4"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let logs = tempdir().unwrap();

        let session = BatchSession::new(Settings::default(), Arc::new(ScriptedExecutor::new()))
            .with_log_dir(logs.path());
        let handle = session
            .start(BatchRequest::new(
                dir.path(),
                OperationMode::Compress,
                JobInput::default(),
            ))
            .unwrap();

        let mut lines = Vec::new();
        while !handle.is_finished() {
            lines.extend(handle.drain_log());
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let progress = handle.progress();
        let (result, feed) = handle.join();
        lines.extend(feed.drain());

        assert_eq!(result.unwrap().total, 2);
        assert!(progress.finished);
        assert_eq!(progress.completed, 2);
        assert!(feed.is_closed());

        let joined = lines.join("\n");
        assert!(joined.contains("[1/2] a.mp4"));
        assert!(joined.contains("[2/2] b.mp4"));

        let run_logs: Vec<_> = fs::read_dir(logs.path()).unwrap().collect();
        assert_eq!(run_logs.len(), 1);
    }

    #[test]
    fn precondition_failure_is_returned_from_join() {
        let dir = tempdir().unwrap();
        let session = BatchSession::new(Settings::default(), Arc::new(ScriptedExecutor::new()));
        let handle = session
            .start(BatchRequest::new(
                dir.path(),
                OperationMode::Compress,
                JobInput::default(),
            ))
            .unwrap();

        let (result, feed) = handle.join();
        assert!(matches!(result, Err(BatchError::EmptyFolder(_))));
        assert!(feed.drain().iter().any(|l| l.contains("Folder is empty")));
    }
}
