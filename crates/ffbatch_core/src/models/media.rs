//! Discovered input files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::MediaFamily;

/// Recognised video container extensions (lowercase).
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"];

/// Recognised audio container extensions (lowercase).
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "m4a"];

impl MediaFamily {
    /// Infer the family from an extension, case-insensitively.
    ///
    /// Returns `None` for anything outside the allow-list.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let lower = extension.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&lower.as_str()) {
            Some(Self::Video)
        } else if AUDIO_EXTENSIONS.contains(&lower.as_str()) {
            Some(Self::Audio)
        } else {
            None
        }
    }
}

/// An input file recognised by its extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// File name including extension.
    pub file_name: String,
    /// File name without extension.
    pub stem: String,
    /// Extension as written on disk (case preserved).
    pub extension: String,
    /// Container family.
    pub family: MediaFamily,
}

impl MediaFile {
    /// Recognise a path as a media file.
    ///
    /// Returns `None` when the extension is missing or not allow-listed.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let extension = path.extension()?.to_string_lossy().to_string();
        let family = MediaFamily::from_extension(&extension)?;
        let file_name = path.file_name()?.to_string_lossy().to_string();
        let stem = path.file_stem()?.to_string_lossy().to_string();

        Some(Self {
            path,
            file_name,
            stem,
            extension,
            family,
        })
    }

    /// Folder containing the file.
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Path of the `<stem><suffix>.<ext>` companion next to this file.
    pub fn companion_path(&self, companion_suffix: &str) -> PathBuf {
        self.folder()
            .join(format!("{}{}.{}", self.stem, companion_suffix, self.extension))
    }

    /// Whether this file itself is a companion (`<stem><suffix>.<ext>`).
    pub fn is_companion(&self, companion_suffix: &str) -> bool {
        !companion_suffix.is_empty() && self.stem.ends_with(companion_suffix)
    }
}

/// An original with its present companion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedMediaFile {
    /// The original clip (clean head/tail, full audio).
    pub original: MediaFile,
    /// The no-subtitle variant used for the middle.
    pub companion: PathBuf,
}

/// A splice original, paired or not.
///
/// Unpaired candidates are still scheduled so the missing companion is
/// reported as that file's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceCandidate {
    pub original: MediaFile,
    /// Expected companion path.
    pub companion: PathBuf,
    /// Whether the companion existed at discovery time.
    pub companion_present: bool,
}

impl SpliceCandidate {
    /// Convert into a pair when the companion is present.
    pub fn into_pair(self) -> Option<PairedMediaFile> {
        if self.companion_present {
            Some(PairedMediaFile {
                original: self.original,
                companion: self.companion,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_allow_listed_extensions() {
        let file = MediaFile::from_path("/videos/Clip.MP4").unwrap();
        assert_eq!(file.family, MediaFamily::Video);
        assert_eq!(file.stem, "Clip");
        assert_eq!(file.extension, "MP4");

        let audio = MediaFile::from_path("/music/song.m4a").unwrap();
        assert_eq!(audio.family, MediaFamily::Audio);

        assert!(MediaFile::from_path("/docs/readme.txt").is_none());
        assert!(MediaFile::from_path("/videos/noext").is_none());
    }

    #[test]
    fn companion_path_inserts_suffix() {
        let file = MediaFile::from_path("/videos/episode 01.mkv").unwrap();
        assert_eq!(
            file.companion_path("_no_sub"),
            PathBuf::from("/videos/episode 01_no_sub.mkv")
        );
        assert!(!file.is_companion("_no_sub"));

        let companion = MediaFile::from_path("/videos/episode 01_no_sub.mkv").unwrap();
        assert!(companion.is_companion("_no_sub"));
    }

    #[test]
    fn unpaired_candidate_has_no_pair() {
        let original = MediaFile::from_path("/videos/a.mp4").unwrap();
        let candidate = SpliceCandidate {
            companion: original.companion_path("_no_sub"),
            original,
            companion_present: false,
        };
        assert!(candidate.into_pair().is_none());
    }
}
