//! Command builder for every encoder invocation the pipeline makes.
//!
//! Transform commands have the shape
//! `ffmpeg -i <input> [-vf <graph>] <encoder args...> <output>`.
//! The splice commands (audio extraction, segment cuts, concat, remux) are
//! built here as well so all argument layouts live in one place.

use std::path::Path;

use crate::config::SpliceSettings;
use crate::models::{JobParameters, OperationMode};
use crate::orchestrator::{StepError, StepResult};

use super::filter::{mask_filter, TimeWindow};
use super::tool_command::ToolCommand;

/// Builds `ToolCommand`s for the encoder executable.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    ffmpeg: String,
}

impl CommandBuilder {
    /// Create a builder for the given encoder executable.
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    fn base(&self) -> ToolCommand {
        ToolCommand::new(&self.ffmpeg)
    }

    /// Per-file transform command for compress and masking modes.
    ///
    /// `duration` is required when the mode applies a trailing window.
    pub fn transform(
        &self,
        mode: OperationMode,
        params: &JobParameters,
        input: &Path,
        output: &Path,
        duration: Option<f64>,
    ) -> StepResult<ToolCommand> {
        let mut cmd = self.base();
        cmd.arg("-i").arg(input);

        if let Some(regions) = params.regions.as_ref().filter(|r| !r.is_empty()) {
            let window = match params.effective_window(mode) {
                Some(window) => {
                    let duration = duration.ok_or_else(|| {
                        StepError::invalid_input(format!(
                            "duration of {} is required for a trailing window",
                            input.display()
                        ))
                    })?;
                    Some(TimeWindow::trailing(duration, window))
                }
                None => None,
            };
            cmd.arg("-vf").arg(mask_filter(regions, window));
        }

        cmd.args(&params.encoder_args);
        cmd.arg(output);
        Ok(cmd)
    }

    /// Extract the full audio track of `input`.
    pub fn extract_audio(&self, input: &Path, output: &Path, splice: &SpliceSettings) -> ToolCommand {
        let mut cmd = self.base();
        cmd.arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-c:a")
            .arg(&splice.audio_codec)
            .arg("-b:a")
            .arg(&splice.audio_bitrate)
            .arg("-y")
            .arg(output);
        cmd
    }

    /// Cut a silent video segment starting at `start` seconds.
    ///
    /// `length` of `None` takes the remainder of the clip.
    pub fn segment(
        &self,
        input: &Path,
        start: f64,
        length: Option<f64>,
        encoder_args: &[String],
        output: &Path,
    ) -> ToolCommand {
        let mut cmd = self.base();
        if start > 0.0 {
            cmd.arg("-ss").arg(format_seconds(start));
        }
        cmd.arg("-i").arg(input);
        if let Some(length) = length {
            cmd.arg("-t").arg(format_seconds(length));
        }
        cmd.arg("-an");
        cmd.args(encoder_args);
        if !encoder_args.iter().any(|a| a == "-y") {
            cmd.arg("-y");
        }
        cmd.arg(output);
        cmd
    }

    /// Join segments listed in a concat manifest without re-encoding.
    pub fn concat(&self, manifest: &Path, output: &Path) -> ToolCommand {
        let mut cmd = self.base();
        cmd.arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(manifest)
            .arg("-c")
            .arg("copy")
            .arg("-y")
            .arg(output);
        cmd
    }

    /// Mux the merged video with the extracted audio.
    pub fn remux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        splice: &SpliceSettings,
    ) -> ToolCommand {
        let mut cmd = self.base();
        cmd.arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .arg("-map")
            .arg("0:v:0")
            .arg("-map")
            .arg("1:a:0")
            .arg("-c:v")
            .arg("copy")
            .arg("-c:a")
            .arg(&splice.audio_codec)
            .arg("-b:a")
            .arg(&splice.audio_bitrate)
            .arg("-shortest")
            .arg("-y")
            .arg(output);
        cmd
    }
}

/// Seconds with millisecond precision, as the encoder expects.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobInput, RegionList};
    use std::path::PathBuf;

    fn params(mode: OperationMode, regions: Option<&str>, window: Option<&str>) -> JobParameters {
        let input = JobInput {
            encoder_args: "-c:v libx264 -crf 23 -y".to_string(),
            regions: regions.map(str::to_string),
            window_seconds: window.map(str::to_string),
            ..Default::default()
        };
        JobParameters::from_input(mode, &input).unwrap()
    }

    #[test]
    fn compress_passes_args_verbatim() {
        let builder = CommandBuilder::new("ffmpeg");
        let cmd = builder
            .transform(
                OperationMode::Compress,
                &params(OperationMode::Compress, None, None),
                Path::new("/v/a.mp4"),
                Path::new("/v/a_c.mp4"),
                None,
            )
            .unwrap();
        assert_eq!(
            cmd.arg_strings(),
            vec!["-i", "/v/a.mp4", "-c:v", "libx264", "-crf", "23", "-y", "/v/a_c.mp4"]
        );
    }

    #[test]
    fn filter_precedes_encoder_args() {
        let builder = CommandBuilder::new("ffmpeg");
        let cmd = builder
            .transform(
                OperationMode::RemoveSubtitle,
                &params(OperationMode::RemoveSubtitle, Some("1,2,3,4"), None),
                Path::new("a.mp4"),
                Path::new("a_s.mp4"),
                None,
            )
            .unwrap();
        let args = cmd.arg_strings();
        assert_eq!(&args[..4], &["-i", "a.mp4", "-vf", "delogo=x=1:y=2:w=3:h=4"]);
        assert_eq!(args.last().map(String::as_str), Some("a_s.mp4"));
    }

    #[test]
    fn windowed_trailer_uses_duration() {
        let builder = CommandBuilder::new("ffmpeg");
        let p = params(OperationMode::RemoveTrailer, Some("1,2,3,4&5,6,7,8"), Some("2.2"));
        let cmd = builder
            .transform(
                OperationMode::RemoveTrailer,
                &p,
                Path::new("a.mp4"),
                Path::new("a_w.mp4"),
                Some(10.0),
            )
            .unwrap();
        assert_eq!(
            cmd.value_after("-vf").unwrap(),
            "delogo=x=1:y=2:w=3:h=4,delogo=x=5:y=6:w=7:h=8:enable='between(t,7.800,10.000)'"
        );

        let missing = builder.transform(
            OperationMode::RemoveTrailer,
            &p,
            Path::new("a.mp4"),
            Path::new("a_w.mp4"),
            None,
        );
        assert!(matches!(missing, Err(StepError::InvalidInput(_))));
    }

    #[test]
    fn trailer_without_window_masks_whole_clip() {
        let builder = CommandBuilder::new("ffmpeg");
        let p = JobParameters {
            regions: Some(RegionList::parse("1,2,3,4").unwrap()),
            ..Default::default()
        };
        let cmd = builder
            .transform(
                OperationMode::RemoveTrailer,
                &p,
                Path::new("a.mp4"),
                Path::new("a_w.mp4"),
                None,
            )
            .unwrap();
        assert_eq!(cmd.value_after("-vf").unwrap(), "delogo=x=1:y=2:w=3:h=4");
    }

    #[test]
    fn splice_commands_have_expected_shape() {
        let builder = CommandBuilder::new("ffmpeg");
        let splice = SpliceSettings::default();

        let audio = builder.extract_audio(Path::new("o.mp4"), Path::new("t.m4a"), &splice);
        assert_eq!(
            audio.arg_strings(),
            vec!["-i", "o.mp4", "-vn", "-c:a", "aac", "-b:a", "192k", "-y", "t.m4a"]
        );

        let head = builder.segment(
            Path::new("o.mp4"),
            0.0,
            Some(1.5),
            &["-c:v".to_string(), "libx264".to_string()],
            Path::new("h.mp4"),
        );
        assert_eq!(
            head.arg_strings(),
            vec!["-i", "o.mp4", "-t", "1.500", "-an", "-c:v", "libx264", "-y", "h.mp4"]
        );

        let tail = builder.segment(Path::new("o.mp4"), 7.0, None, &[], Path::new("t.mp4"));
        assert_eq!(
            tail.arg_strings(),
            vec!["-ss", "7.000", "-i", "o.mp4", "-an", "-y", "t.mp4"]
        );

        let concat = builder.concat(Path::new("list.txt"), Path::new("m.mp4"));
        assert_eq!(concat.value_after("-f").unwrap(), "concat");
        assert_eq!(concat.value_after("-i").unwrap(), "list.txt");

        let remux = builder.remux(
            Path::new("m.mp4"),
            Path::new("t.m4a"),
            &PathBuf::from("OK/spliced_o.mp4"),
            &splice,
        );
        let args = remux.arg_strings();
        assert!(args.contains(&"-shortest".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("OK/spliced_o.mp4"));
    }
}
