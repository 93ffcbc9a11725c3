//! Concat step - joins the segments with the concat demuxer.

use std::fs;
use std::path::Path;

use crate::orchestrator::errors::{require_input, require_output, StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SpliceState, StepOutcome};

/// Concat demuxer manifest, one `file '<path>'` line per segment in order.
pub fn build_manifest(segments: &[&Path]) -> String {
    let mut manifest = String::new();
    for segment in segments {
        // Single quotes inside a quoted path are written as '\''
        let escaped = segment.to_string_lossy().replace('\'', "'\\''");
        manifest.push_str(&format!("file '{}'\n", escaped));
    }
    manifest
}

/// Writes the manifest and concatenates without re-encoding.
pub struct ConcatVideoStep;

impl ConcatVideoStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConcatVideoStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ConcatVideoStep {
    fn name(&self) -> &str {
        "ConcatVideo"
    }

    fn description(&self) -> &str {
        "Concatenate segments"
    }

    fn validate_input(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        let segments = state.segments();
        if segments.is_empty() {
            return Err(StepError::invalid_input("No segments to concatenate"));
        }
        for segment in segments {
            require_input(segment, "Segment")?;
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let manifest_text = build_manifest(&state.segments());
        ctx.logger
            .debug(&format!("Concat manifest:\n{}", manifest_text.trim_end()));

        let manifest = state.temps.allocate("segments", "txt")?;
        fs::write(&manifest, manifest_text)
            .map_err(|e| StepError::io_error("writing concat manifest", e))?;
        state.manifest = Some(manifest.clone());

        let merged = state.temps.allocate("merged", ctx.video_extension())?;
        ctx.run(&ctx.commands().concat(&manifest, &merged))?;

        state.merged = Some(merged);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        let merged = state
            .merged
            .as_deref()
            .ok_or_else(|| StepError::invalid_output("Merged video path not recorded"))?;
        require_output(merged, "Merged video")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_segments_in_order() {
        let manifest = build_manifest(&[
            Path::new("/tmp/a_01_head.mp4"),
            Path::new("/tmp/a_02_middle.mp4"),
            Path::new("/tmp/a_03_tail.mp4"),
        ]);
        assert_eq!(
            manifest,
            "file '/tmp/a_01_head.mp4'\nfile '/tmp/a_02_middle.mp4'\nfile '/tmp/a_03_tail.mp4'\n"
        );
    }

    #[test]
    fn manifest_escapes_single_quotes() {
        let manifest = build_manifest(&[Path::new("/tmp/it's.mp4")]);
        assert_eq!(manifest, "file '/tmp/it'\\''s.mp4'\n");
    }
}
