//! Probe and clamp steps - measure the original and fix the cut points.

use crate::orchestrator::errors::{require_input, StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::timeline::SpliceTimeline;
use crate::orchestrator::types::{Context, SpliceState, StepOutcome};

/// Reads the original's duration with ffprobe.
pub struct ProbeDurationStep;

impl ProbeDurationStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProbeDurationStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ProbeDurationStep {
    fn name(&self) -> &str {
        "ProbeDuration"
    }

    fn description(&self) -> &str {
        "Probe duration of the original"
    }

    fn validate_input(&self, ctx: &Context, _state: &SpliceState) -> StepResult<()> {
        require_input(ctx.original(), "Original")
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let duration = ctx
            .probe()
            .duration(ctx.executor.as_ref(), ctx.original(), &ctx.logger)?;
        state.duration = Some(duration);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &SpliceState) -> StepResult<()> {
        match state.duration {
            Some(d) if d > 0.0 => Ok(()),
            _ => Err(StepError::probe_failure(
                ctx.original(),
                "clip has zero duration",
            )),
        }
    }
}

/// Caps head and tail to the clip and logs every adjustment.
pub struct ClampDurationsStep;

impl ClampDurationsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClampDurationsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ClampDurationsStep {
    fn name(&self) -> &str {
        "ClampDurations"
    }

    fn description(&self) -> &str {
        "Clamp head and tail to the clip"
    }

    fn validate_input(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        if state.duration.is_none() {
            return Err(StepError::invalid_input("Duration has not been probed"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let duration = state
            .duration
            .ok_or_else(|| StepError::invalid_input("Duration has not been probed"))?;

        let timeline = SpliceTimeline::clamp(duration, &ctx.splice);
        for note in &timeline.adjustments {
            ctx.logger.warn(note);
        }
        ctx.logger.info(&format!(
            "Head {:.3}s, middle {:.3}s, tail {:.3}s (tail starts at {:.3}s)",
            timeline.head,
            timeline.middle_duration(),
            timeline.tail,
            timeline.tail_start
        ));

        state.timeline = Some(timeline);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        if state.timeline.is_none() {
            return Err(StepError::invalid_output("Timeline not recorded"));
        }
        Ok(())
    }
}
