//! Job parameters parsed from operator text input.
//!
//! The presentation layer hands over raw strings ([`JobInput`]); they are
//! validated once, before any file is touched, into [`JobParameters`].

use serde::{Deserialize, Serialize};

use super::enums::OperationMode;
use super::error::ParameterError;
use super::region::RegionList;

/// Raw text fields collected by the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobInput {
    /// Free-form encoder arguments, whitespace separated.
    pub encoder_args: String,
    /// Region list (`x,y,w,h&x,y,w,h`).
    pub regions: Option<String>,
    /// Trailing window in seconds (trailer mode).
    pub window_seconds: Option<String>,
    /// Head length in seconds (splice mode). Presence enables the head.
    pub head_seconds: Option<String>,
    /// Tail length in seconds (splice mode). Presence enables the tail.
    pub tail_seconds: Option<String>,
}

/// Head/tail selection for splice mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpliceConfig {
    pub splice_head: bool,
    pub splice_tail: bool,
    pub head_seconds: f64,
    pub tail_seconds: f64,
}

impl SpliceConfig {
    /// Build from optional head/tail durations; `None` disables that side.
    pub fn new(head: Option<f64>, tail: Option<f64>) -> Result<Self, ParameterError> {
        let config = Self {
            splice_head: head.is_some(),
            splice_tail: tail.is_some(),
            head_seconds: head.unwrap_or(0.0),
            tail_seconds: tail.unwrap_or(0.0),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject a configuration with neither side enabled.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !self.splice_head && !self.splice_tail {
            return Err(ParameterError::NoSpliceSide);
        }
        Ok(())
    }
}

/// Validated parameters shared by every file of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    /// Encoder tokens passed through verbatim, in order.
    pub encoder_args: Vec<String>,
    /// Regions to mask, if any.
    pub regions: Option<RegionList>,
    /// Apply the last region only during the final N seconds.
    pub window_seconds: Option<f64>,
    /// Splice head/tail selection (splice mode only).
    pub splice: Option<SpliceConfig>,
}

impl JobParameters {
    /// Validate raw input for the given mode.
    pub fn from_input(mode: OperationMode, input: &JobInput) -> Result<Self, ParameterError> {
        let encoder_args = tokenize_args(&input.encoder_args);

        let regions = match &input.regions {
            Some(text) => Some(RegionList::parse(text)?),
            None => None,
        };
        if mode.requires_regions() && regions.is_none() {
            return Err(ParameterError::MissingRegions { mode });
        }

        let window_seconds = input
            .window_seconds
            .as_deref()
            .map(|text| parse_seconds("window", text))
            .transpose()?;

        let splice = if mode.is_splice() {
            let head = input
                .head_seconds
                .as_deref()
                .map(|text| parse_seconds("head", text))
                .transpose()?;
            let tail = input
                .tail_seconds
                .as_deref()
                .map(|text| parse_seconds("tail", text))
                .transpose()?;
            Some(SpliceConfig::new(head, tail)?)
        } else {
            None
        };

        Ok(Self {
            encoder_args,
            regions,
            window_seconds,
            splice,
        })
    }

    /// The trailing window, when it applies to the given mode.
    ///
    /// Only trailer removal with a region list uses a window; anywhere else
    /// it is ignored.
    pub fn effective_window(&self, mode: OperationMode) -> Option<f64> {
        match (mode, &self.regions, self.window_seconds) {
            (OperationMode::RemoveTrailer, Some(_), Some(window)) => Some(window),
            _ => None,
        }
    }

    /// Whether the clip duration must be probed before building commands.
    pub fn needs_probe(&self, mode: OperationMode) -> bool {
        mode.is_splice() || self.effective_window(mode).is_some()
    }

    /// Set the encoder args from a whitespace-separated string.
    pub fn with_encoder_args(mut self, text: &str) -> Self {
        self.encoder_args = tokenize_args(text);
        self
    }
}

/// Split encoder arguments on whitespace, dropping empty tokens.
pub fn tokenize_args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Parse a duration field as finite, non-negative seconds.
pub fn parse_seconds(field: &str, text: &str) -> Result<f64, ParameterError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ParameterError::invalid_number(field, text)),
    }
}
