//! Splice orchestrator.
//!
//! A splice job is a sequence of steps that each validate, execute and
//! record their results. Intermediate files belong to a [`TempScope`] that
//! is released once the pipeline ends, whatever the outcome.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: ProbeDuration
//!     ├── Step: ClampDurations
//!     ├── Step: ExtractAudio
//!     ├── Step: BuildHeadSegment
//!     ├── Step: BuildMiddleSegment
//!     ├── Step: BuildTailSegment
//!     ├── Step: ConcatVideo
//!     └── Step: RemuxWithAudio
//! Cleanup (always)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ffbatch_core::orchestrator::{run_splice_job, Context};
//!
//! let ctx = Context::new(pair, splice, settings, output_path, logger, executor)
//!     .with_encoder_args(encoder_args);
//! let result = run_splice_job(&ctx)?;
//! println!("Wrote {}", result.output_path.display());
//! ```

mod errors;
mod pipeline;
mod splice;
mod step;
pub mod steps;
mod temp;
mod timeline;
mod types;

pub use errors::{
    require_input, require_output, PipelineError, PipelineResult, StepError, StepResult,
};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use splice::{run_splice_job, SpliceResult};
pub use step::PipelineStep;
pub use steps::{
    ClampDurationsStep, ConcatVideoStep, ExtractAudioStep, HeadSegmentStep, MiddleSegmentStep,
    ProbeDurationStep, RemuxWithAudioStep, TailSegmentStep,
};
pub use temp::{CleanupReport, TempArtifact, TempScope};
pub use timeline::SpliceTimeline;
pub use types::{Context, ProgressCallback, SpliceState, StepOutcome};

/// Create the splice pipeline with all steps in order.
///
/// 1. ProbeDuration - duration of the original
/// 2. ClampDurations - fit head and tail into the clip
/// 3. ExtractAudio - full audio track of the original
/// 4. BuildHeadSegment - original `[0, head)`
/// 5. BuildMiddleSegment - companion `[head, tail_start)`
/// 6. BuildTailSegment - original `[tail_start, end)`
/// 7. ConcatVideo - join the segments
/// 8. RemuxWithAudio - merged video + original audio
pub fn create_splice_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ProbeDurationStep::new())
        .with_step(ClampDurationsStep::new())
        .with_step(ExtractAudioStep::new())
        .with_step(HeadSegmentStep::new())
        .with_step(MiddleSegmentStep::new())
        .with_step(TailSegmentStep::new())
        .with_step(ConcatVideoStep::new())
        .with_step(RemuxWithAudioStep::new())
}
