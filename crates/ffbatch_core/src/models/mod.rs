//! Data models for ffbatch.
//!
//! This module contains the core data structures used throughout the pipeline:
//! - Operation modes and media families
//! - Masked region descriptors (`x,y,w,h`, `&`-joined lists)
//! - Job parameters parsed from operator text input
//! - Discovered media files and splice pairs

mod enums;
mod error;
mod media;
mod params;
mod region;

pub use enums::{MediaFamily, OperationMode};
pub use error::ParameterError;
pub use media::{
    MediaFile, PairedMediaFile, SpliceCandidate, AUDIO_EXTENSIONS, VIDEO_EXTENSIONS,
};
pub use params::{parse_seconds, tokenize_args, JobInput, JobParameters, SpliceConfig};
pub use region::{RegionList, RegionSpec, REGION_DELIMITER};
