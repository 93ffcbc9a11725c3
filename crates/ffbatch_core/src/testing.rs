//! Test doubles shared by unit tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::command::ToolCommand;
use crate::config::Settings;
use crate::logging::{log_channel, LogConfig, LogFeed, RunLogger};
use crate::models::{MediaFile, PairedMediaFile, SpliceConfig};
use crate::orchestrator::{Context, SpliceState, StepError, StepResult, TempScope};
use crate::process::CommandExecutor;

type FailPredicate = Box<dyn Fn(&ToolCommand) -> bool + Send + Sync>;

/// Executor that never spawns anything.
///
/// - records every command
/// - `run` creates the output file (last argument), even when failing
/// - fails commands matching the predicate with exit code 1
/// - `capture` returns the configured duration text
/// - copies concat manifests so tests can inspect them after cleanup
pub(crate) struct ScriptedExecutor {
    commands: Mutex<Vec<ToolCommand>>,
    manifests: Mutex<Vec<String>>,
    fail_when: Option<FailPredicate>,
    duration: Option<String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            manifests: Mutex::new(Vec::new()),
            fail_when: None,
            duration: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(format!("{:.6}", seconds));
        self
    }

    pub fn fail_when(
        mut self,
        predicate: impl Fn(&ToolCommand) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.commands.lock().clone()
    }

    pub fn manifests(&self) -> Vec<String> {
        self.manifests.lock().clone()
    }

    fn should_fail(&self, command: &ToolCommand) -> bool {
        self.fail_when.as_ref().is_some_and(|f| f(command))
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<()> {
        logger.command(&command.display());
        self.commands.lock().push(command.clone());

        if command.has_arg("concat") {
            if let Some(manifest) = command.value_after("-i") {
                let text = fs::read_to_string(Path::new(manifest)).unwrap_or_default();
                self.manifests.lock().push(text);
            }
        }

        if let Some(output) = command.last_arg() {
            let output = Path::new(output);
            if let Some(parent) = output.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(output, b"scripted");
        }

        if self.should_fail(command) {
            logger.output_line("scripted failure");
            return Err(StepError::tool_failed(command.tool_name(), 1, "scripted failure"));
        }
        Ok(())
    }

    fn capture(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<String> {
        logger.command(&command.display());
        self.commands.lock().push(command.clone());

        if self.should_fail(command) {
            return Err(StepError::tool_failed(command.tool_name(), 1, "scripted failure"));
        }
        Ok(self.duration.clone().unwrap_or_default())
    }
}

/// Logger feeding a fresh channel, without timestamps.
pub(crate) fn feed_logger(run_name: &str) -> (Arc<RunLogger>, LogFeed) {
    let (sender, feed) = log_channel();
    let config = LogConfig {
        show_timestamps: false,
        ..LogConfig::default()
    };
    (Arc::new(RunLogger::to_feed(run_name, config, sender)), feed)
}

/// A temp folder with `clip.mp4` and its companion, plus everything a
/// splice context needs.
pub(crate) struct SpliceFixture {
    pub dir: TempDir,
    pub settings: Settings,
    pub pair: PairedMediaFile,
    pub logger: Arc<RunLogger>,
    pub feed: LogFeed,
    pub executor: Arc<ScriptedExecutor>,
}

/// Fixture whose probe reports a 10 second clip.
pub(crate) fn splice_fixture() -> SpliceFixture {
    splice_fixture_with(ScriptedExecutor::new().with_duration(10.0))
}

pub(crate) fn splice_fixture_with(executor: ScriptedExecutor) -> SpliceFixture {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.paths.temp_root = dir.path().join("tmp").to_string_lossy().to_string();

    let original_path = dir.path().join("clip.mp4");
    fs::write(&original_path, b"original").unwrap();
    let original = MediaFile::from_path(&original_path).unwrap();
    let companion = original.companion_path(&settings.splice.companion_suffix);
    fs::write(&companion, b"companion").unwrap();

    let (logger, feed) = feed_logger("splice-test");

    SpliceFixture {
        dir,
        settings,
        pair: PairedMediaFile {
            original,
            companion,
        },
        logger,
        feed,
        executor: Arc::new(executor),
    }
}

impl SpliceFixture {
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("OK").join("spliced_clip.mp4")
    }

    pub fn temp_root(&self) -> PathBuf {
        self.settings.paths.temp_dir()
    }

    /// Files left in the temp root (empty when it was never created).
    pub fn temp_files(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.temp_root()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Context for the given head/tail request.
    pub fn ctx(&self, head: Option<f64>, tail: Option<f64>) -> Context {
        let executor: Arc<dyn CommandExecutor> = self.executor.clone();
        Context::new(
            self.pair.clone(),
            SpliceConfig::new(head, tail).unwrap(),
            self.settings.clone(),
            self.output_path(),
            Arc::clone(&self.logger),
            executor,
        )
        .with_encoder_args(vec!["-c:v".to_string(), "libx264".to_string()])
    }

    /// Context plus a fresh state whose temp scope lives in the temp root.
    pub fn context(&self, head: Option<f64>, tail: Option<f64>) -> (Context, SpliceState) {
        let ctx = self.ctx(head, tail);
        let state = SpliceState::new("test-job", TempScope::new(self.temp_root(), &ctx.job_name));
        (ctx, state)
    }
}
