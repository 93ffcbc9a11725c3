//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, SpliceState, StepOutcome};

/// Trait for pipeline steps.
///
/// Each step in the pipeline implements this trait. The pipeline runner
/// calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// # Example
///
/// ```ignore
/// struct ExtractAudioStep;
///
/// impl PipelineStep for ExtractAudioStep {
///     fn name(&self) -> &str { "ExtractAudio" }
///
///     fn validate_input(&self, ctx: &Context, _state: &SpliceState) -> StepResult<()> {
///         require_input(ctx.original(), "Original")
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome> {
///         let audio = state.temps.allocate("audio", "m4a")?;
///         ctx.run(&ctx.commands().extract_audio(ctx.original(), &audio, &ctx.settings.splice))?;
///         state.audio = Some(audio);
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &SpliceState) -> StepResult<()> {
///         require_output(state.audio.as_deref().unwrap(), "Audio track")
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Called before `execute`. Should check that all required
    /// preconditions are met (files exist, previous steps completed, etc.).
    fn validate_input(&self, ctx: &Context, state: &SpliceState) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Should perform the step's processing and record results in `state`.
    /// Returns `StepOutcome::Skipped` if there is nothing to do.
    fn execute(&self, ctx: &Context, state: &mut SpliceState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &SpliceState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
