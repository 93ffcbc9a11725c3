//! Remux step - combines the merged video with the original audio.

use crate::orchestrator::errors::{require_input, require_output, StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SpliceState, StepOutcome};

/// Writes the final output: merged video + extracted audio, cut to the
/// shorter of the two.
pub struct RemuxWithAudioStep;

impl RemuxWithAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RemuxWithAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RemuxWithAudioStep {
    fn name(&self) -> &str {
        "RemuxWithAudio"
    }

    fn description(&self) -> &str {
        "Remux merged video with original audio"
    }

    fn validate_input(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        let merged = state
            .merged
            .as_deref()
            .ok_or_else(|| StepError::invalid_input("No merged video"))?;
        let audio = state
            .audio
            .as_deref()
            .ok_or_else(|| StepError::invalid_input("No extracted audio"))?;
        require_input(merged, "Merged video")?;
        require_input(audio, "Audio track")
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let (Some(merged), Some(audio)) = (state.merged.as_deref(), state.audio.as_deref()) else {
            return Err(StepError::invalid_input("Merged video or audio missing"));
        };

        ctx.logger
            .info(&format!("Output: {}", ctx.output_path.display()));
        ctx.run(&ctx.commands().remux(
            merged,
            audio,
            &ctx.output_path,
            &ctx.settings.splice,
        ))?;

        state.output = Some(ctx.output_path.clone());
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, _state: &SpliceState) -> StepResult<()> {
        require_output(&ctx.output_path, "Spliced output")
    }
}
