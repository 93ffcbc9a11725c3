//! Pipeline step implementations.
//!
//! Each step handles one stage of the splice pipeline.

mod audio;
mod concat;
mod probe;
mod remux;
mod segments;

pub use audio::ExtractAudioStep;
pub use concat::{build_manifest, ConcatVideoStep};
pub use probe::{ClampDurationsStep, ProbeDurationStep};
pub use remux::RemuxWithAudioStep;
pub use segments::{HeadSegmentStep, MiddleSegmentStep, TailSegmentStep};
