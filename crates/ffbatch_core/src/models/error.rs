//! Errors raised while validating operator input.
//!
//! All of these are detected before any file is touched, so the batch
//! runner treats them as batch-fatal.

use thiserror::Error;

use super::enums::OperationMode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A region segment did not match `x,y,w,h`.
    #[error("Invalid region format '{segment}': {reason}")]
    InvalidRegionFormat { segment: String, reason: String },

    /// A duration field was not a finite, non-negative number.
    #[error("Invalid value for {field}: '{value}' (expected a non-negative number of seconds)")]
    InvalidNumericParameter { field: String, value: String },

    /// The mode needs a region list and none was given.
    #[error("{mode} requires at least one region (x,y,w,h)")]
    MissingRegions { mode: OperationMode },

    /// Splice mode with neither head nor tail requested.
    #[error("Splice mode needs a head and/or tail duration")]
    NoSpliceSide,
}

impl ParameterError {
    /// Create an invalid region format error.
    pub fn invalid_region(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegionFormat {
            segment: segment.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid numeric parameter error.
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumericParameter {
            field: field.into(),
            value: value.into(),
        }
    }
}
