//! Core enums used throughout the pipeline.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operation applied to every file of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Re-encode with operator-supplied encoder arguments.
    Compress,
    /// Mask subtitle regions for the whole clip.
    RemoveSubtitle,
    /// Mask regions, the last one only during the trailing window.
    RemoveTrailer,
    /// Reassemble a clean middle with the original head and/or tail.
    SpliceAdvanced,
}

impl OperationMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compress => "Compress",
            Self::RemoveSubtitle => "Remove Subtitle",
            Self::RemoveTrailer => "Remove Trailer Watermark",
            Self::SpliceAdvanced => "Splice (Advanced)",
        }
    }

    /// Short name accepted on the command line.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::RemoveSubtitle => "subtitle",
            Self::RemoveTrailer => "trailer",
            Self::SpliceAdvanced => "splice",
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [OperationMode] {
        &[
            Self::Compress,
            Self::RemoveSubtitle,
            Self::RemoveTrailer,
            Self::SpliceAdvanced,
        ]
    }

    /// Suffix inserted before the output extension.
    ///
    /// Splice mode names its output with a prefix instead (see
    /// `SpliceSettings::output_prefix`), so its suffix is empty.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            Self::Compress => "_c",
            Self::RemoveSubtitle => "_s",
            Self::RemoveTrailer => "_w",
            Self::SpliceAdvanced => "",
        }
    }

    /// Whether a region list must be supplied for this mode.
    pub fn requires_regions(&self) -> bool {
        matches!(self, Self::RemoveSubtitle | Self::RemoveTrailer)
    }

    /// Whether this mode runs the multi-stage splice pipeline.
    pub fn is_splice(&self) -> bool {
        matches!(self, Self::SpliceAdvanced)
    }

    /// Whether outputs always go to the `OK` subdirectory.
    pub fn forces_ok_subdir(&self) -> bool {
        self.is_splice()
    }
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OperationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.cli_name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(|m| m.cli_name()).collect();
                format!("unknown mode '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Broad media family inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFamily {
    Video,
    Audio,
}

impl std::fmt::Display for MediaFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaFamily::Video => write!(f, "video"),
            MediaFamily::Audio => write!(f, "audio"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_cli_names() {
        assert_eq!("compress".parse::<OperationMode>(), Ok(OperationMode::Compress));
        assert_eq!("Trailer".parse::<OperationMode>(), Ok(OperationMode::RemoveTrailer));
        assert_eq!("splice".parse::<OperationMode>(), Ok(OperationMode::SpliceAdvanced));
        assert!("blur".parse::<OperationMode>().is_err());
    }

    #[test]
    fn suffixes_match_modes() {
        assert_eq!(OperationMode::Compress.output_suffix(), "_c");
        assert_eq!(OperationMode::RemoveSubtitle.output_suffix(), "_s");
        assert_eq!(OperationMode::RemoveTrailer.output_suffix(), "_w");
        assert!(OperationMode::SpliceAdvanced.output_suffix().is_empty());
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&OperationMode::RemoveTrailer).unwrap();
        assert_eq!(json, "\"remove_trailer\"");
    }
}
