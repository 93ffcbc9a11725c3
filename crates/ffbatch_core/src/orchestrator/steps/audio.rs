//! Audio step - extracts the original's full audio track.

use crate::orchestrator::errors::{require_input, require_output, StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SpliceState, StepOutcome};

/// Extracts the original's audio for the final remux.
pub struct ExtractAudioStep;

impl ExtractAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractAudioStep {
    fn name(&self) -> &str {
        "ExtractAudio"
    }

    fn description(&self) -> &str {
        "Extract audio from the original"
    }

    fn validate_input(&self, ctx: &Context, _state: &SpliceState) -> StepResult<()> {
        require_input(ctx.original(), "Original")
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let splice = &ctx.settings.splice;
        let audio = state.temps.allocate("audio", &splice.audio_extension)?;

        ctx.run(&ctx.commands().extract_audio(ctx.original(), &audio, splice))?;

        state.audio = Some(audio);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        let audio = state
            .audio
            .as_deref()
            .ok_or_else(|| StepError::invalid_output("Audio path not recorded"))?;
        require_output(audio, "Audio track")
    }
}
