//! Masked region descriptors.
//!
//! A region is written `x,y,w,h` (four non-negative integers, no
//! whitespace). Several regions are joined with `&`; order is kept because
//! trailer removal treats the last region specially.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ParameterError;

/// Separator between regions in a list.
pub const REGION_DELIMITER: char = '&';

/// A rectangle to mask, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionSpec {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl RegionSpec {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Parse a single `x,y,w,h` region.
    pub fn parse(segment: &str) -> Result<Self, ParameterError> {
        if segment.is_empty() {
            return Err(ParameterError::invalid_region(segment, "empty region"));
        }

        let parts: Vec<&str> = segment.split(',').collect();
        if parts.len() != 4 {
            return Err(ParameterError::invalid_region(
                segment,
                format!("expected 4 components, found {}", parts.len()),
            ));
        }

        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = parse_component(segment, part)?;
        }

        let [x, y, w, h] = values;
        Ok(Self { x, y, w, h })
    }
}

/// Parse one integer component; only ASCII digits are accepted.
fn parse_component(segment: &str, part: &str) -> Result<u32, ParameterError> {
    if part.is_empty() {
        return Err(ParameterError::invalid_region(segment, "empty component"));
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParameterError::invalid_region(
            segment,
            format!("'{}' is not a non-negative integer", part),
        ));
    }
    part.parse::<u32>()
        .map_err(|_| ParameterError::invalid_region(segment, format!("'{}' is out of range", part)))
}

impl FromStr for RegionSpec {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for RegionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.w, self.h)
    }
}

/// Ordered, non-empty list of regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionList(Vec<RegionSpec>);

impl RegionList {
    /// Parse an `&`-joined list. Every member must be a valid region.
    pub fn parse(text: &str) -> Result<Self, ParameterError> {
        let regions = text
            .split(REGION_DELIMITER)
            .map(RegionSpec::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(regions))
    }

    pub fn as_slice(&self) -> &[RegionSpec] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into the last (windowed) region and the always-on regions.
    pub fn split_last(&self) -> Option<(&RegionSpec, &[RegionSpec])> {
        self.0.split_last()
    }
}

impl FromStr for RegionList {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for RegionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", joined.join(&REGION_DELIMITER.to_string()))
    }
}

impl<'a> IntoIterator for &'a RegionList {
    type Item = &'a RegionSpec;
    type IntoIter = std::slice::Iter<'a, RegionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
