//! Duration probing with ffprobe.
//!
//! Only the container duration is read:
//! `ffprobe -v error -show_entries format=duration -of default=noprint_wrappers=1:nokey=1 <input>`

use std::path::Path;

use crate::command::ToolCommand;
use crate::logging::RunLogger;
use crate::orchestrator::{StepError, StepResult};
use crate::process::CommandExecutor;

/// Probes clip durations.
#[derive(Debug, Clone)]
pub struct ProbeService {
    ffprobe: String,
}

impl ProbeService {
    /// Create a probe service for the given ffprobe executable.
    pub fn new(ffprobe: impl Into<String>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    /// Build the probe command for `input`.
    pub fn duration_command(&self, input: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input);
        cmd
    }

    /// Duration of `input` in seconds.
    ///
    /// A failed probe, empty output, or a value that is not a finite,
    /// non-negative number is a `ProbeFailure`.
    pub fn duration(
        &self,
        executor: &dyn CommandExecutor,
        input: &Path,
        logger: &RunLogger,
    ) -> StepResult<f64> {
        let output = executor
            .capture(&self.duration_command(input), logger)
            .map_err(|e| match e {
                StepError::ExternalToolFailure { exit_code, .. } => {
                    StepError::probe_failure(input, format!("ffprobe exited with code {}", exit_code))
                }
                other => other,
            })?;

        let duration = parse_duration(input, &output)?;
        logger.info(&format!("Duration: {:.3}s", duration));
        Ok(duration)
    }
}

/// Parse ffprobe's duration output (first non-empty line).
pub fn parse_duration(input: &Path, output: &str) -> StepResult<f64> {
    let Some(line) = output.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Err(StepError::probe_failure(input, "no duration reported"));
    };

    match line.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(StepError::probe_failure(
            input,
            format!("unparseable duration '{}'", line),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{log_channel, LogConfig};
    use crate::testing::ScriptedExecutor;

    #[test]
    fn parses_plain_duration() {
        let p = Path::new("a.mp4");
        assert_eq!(parse_duration(p, "12.345000\n").unwrap(), 12.345);
        assert_eq!(parse_duration(p, "\n  10\n").unwrap(), 10.0);
    }

    #[test]
    fn rejects_bad_output() {
        let p = Path::new("a.mp4");
        for bad in ["", "   \n", "N/A", "-1.0", "inf", "NaN"] {
            assert!(
                matches!(parse_duration(p, bad), Err(StepError::ProbeFailure { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn builds_probe_command() {
        let cmd = ProbeService::new("ffprobe").duration_command(Path::new("/v/a.mp4"));
        assert_eq!(
            cmd.display(),
            "ffprobe -v error -show_entries format=duration -of default=noprint_wrappers=1:nokey=1 /v/a.mp4"
        );
    }

    #[test]
    fn failed_probe_becomes_probe_failure() {
        let (tx, _feed) = log_channel();
        let logger = RunLogger::to_feed("probe", LogConfig::default(), tx);
        let executor = ScriptedExecutor::new().fail_when(|cmd| cmd.tool_name() == "ffprobe");

        let err = ProbeService::new("ffprobe")
            .duration(&executor, Path::new("a.mp4"), &logger)
            .unwrap_err();
        assert!(matches!(err, StepError::ProbeFailure { .. }));
    }

    #[test]
    fn returns_scripted_duration() {
        let (tx, _feed) = log_channel();
        let logger = RunLogger::to_feed("probe", LogConfig::default(), tx);
        let executor = ScriptedExecutor::new().with_duration(42.5);

        let d = ProbeService::new("ffprobe")
            .duration(&executor, Path::new("a.mp4"), &logger)
            .unwrap();
        assert_eq!(d, 42.5);
    }
}
