//! Segment steps - cut the head and tail from the original and the middle
//! from the companion.
//!
//! All segments are silent and re-encoded with the job's encoder arguments
//! so they can be concatenated without another encode.

use std::path::{Path, PathBuf};

use crate::orchestrator::errors::{require_input, require_output, StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::timeline::SpliceTimeline;
use crate::orchestrator::types::{Context, SpliceState, StepOutcome};

fn timeline(state: &SpliceState) -> StepResult<&SpliceTimeline> {
    state
        .timeline
        .as_ref()
        .ok_or_else(|| StepError::invalid_input("Timeline has not been computed"))
}

fn recorded<'a>(path: &'a Option<PathBuf>, what: &str) -> StepResult<&'a Path> {
    path.as_deref()
        .ok_or_else(|| StepError::invalid_output(format!("{} path not recorded", what)))
}

/// Cut `[0, head)` from the original.
pub struct HeadSegmentStep;

impl HeadSegmentStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeadSegmentStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for HeadSegmentStep {
    fn name(&self) -> &str {
        "BuildHeadSegment"
    }

    fn description(&self) -> &str {
        "Cut head segment from the original"
    }

    fn validate_input(&self, ctx: &Context, state: &SpliceState) -> StepResult<()> {
        timeline(state)?;
        require_input(ctx.original(), "Original")
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let timeline = timeline(state)?;
        if !timeline.has_head() {
            return Ok(StepOutcome::Skipped("no head requested".to_string()));
        }
        let head = timeline.head;

        let path = state.temps.allocate("head", ctx.video_extension())?;
        ctx.run(&ctx.commands().segment(
            ctx.original(),
            0.0,
            Some(head),
            &ctx.encoder_args,
            &path,
        ))?;

        state.head = Some(path);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        require_output(recorded(&state.head, "Head segment")?, "Head segment")
    }
}

/// Cut `[head, tail_start)` from the companion.
pub struct MiddleSegmentStep;

impl MiddleSegmentStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MiddleSegmentStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MiddleSegmentStep {
    fn name(&self) -> &str {
        "BuildMiddleSegment"
    }

    fn description(&self) -> &str {
        "Cut middle segment from the companion"
    }

    fn validate_input(&self, ctx: &Context, state: &SpliceState) -> StepResult<()> {
        timeline(state)?;
        require_input(ctx.companion(), "Companion")
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let timeline = timeline(state)?;
        if !timeline.has_middle() {
            return Ok(StepOutcome::Skipped(
                "head and tail cover the whole clip".to_string(),
            ));
        }
        let (start, length) = (timeline.head, timeline.middle_length());

        let path = state.temps.allocate("middle", ctx.video_extension())?;
        ctx.run(&ctx.commands().segment(
            ctx.companion(),
            start,
            length,
            &ctx.encoder_args,
            &path,
        ))?;

        state.middle = Some(path);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        require_output(recorded(&state.middle, "Middle segment")?, "Middle segment")
    }
}

/// Cut `[tail_start, end)` from the original.
pub struct TailSegmentStep;

impl TailSegmentStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TailSegmentStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TailSegmentStep {
    fn name(&self) -> &str {
        "BuildTailSegment"
    }

    fn description(&self) -> &str {
        "Cut tail segment from the original"
    }

    fn validate_input(&self, ctx: &Context, state: &SpliceState) -> StepResult<()> {
        timeline(state)?;
        require_input(ctx.original(), "Original")
    }

    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
        let timeline = timeline(state)?;
        if !timeline.has_tail() {
            return Ok(StepOutcome::Skipped("no tail requested".to_string()));
        }
        let start = timeline.tail_start;

        let path = state.temps.allocate("tail", ctx.video_extension())?;
        ctx.run(&ctx.commands().segment(
            ctx.original(),
            start,
            None,
            &ctx.encoder_args,
            &path,
        ))?;

        state.tail = Some(path);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
        require_output(recorded(&state.tail, "Tail segment")?, "Tail segment")
    }
}
