//! Folder validation and file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{MediaFamily, MediaFile, SpliceCandidate};

use super::errors::{BatchError, BatchResult};

/// Check that `folder` exists, is a directory and is not empty.
pub fn validate_folder(folder: &Path) -> BatchResult<()> {
    if !folder.is_dir() {
        return Err(BatchError::InvalidFolder(folder.to_path_buf()));
    }
    let mut entries =
        fs::read_dir(folder).map_err(|e| BatchError::io("reading input folder", e))?;
    if entries.next().is_none() {
        return Err(BatchError::EmptyFolder(folder.to_path_buf()));
    }
    Ok(())
}

/// Regular files directly inside `folder`, sorted by file name.
fn sorted_files(folder: &Path) -> BatchResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(|e| BatchError::io("reading input folder", e))? {
        let entry = entry.map_err(|e| BatchError::io("reading input folder", e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Media files in `folder` (allow-listed extensions), in file-name order.
pub fn discover_media(folder: &Path) -> BatchResult<Vec<MediaFile>> {
    Ok(sorted_files(folder)?
        .into_iter()
        .filter_map(MediaFile::from_path)
        .collect())
}

/// Splice originals among `files`.
///
/// Audio files and companions are not originals. Every original is kept,
/// with `companion_present` telling whether its companion exists.
pub fn splice_candidates(files: &[MediaFile], companion_suffix: &str) -> Vec<SpliceCandidate> {
    files
        .iter()
        .filter(|f| f.family == MediaFamily::Video && !f.is_companion(companion_suffix))
        .map(|f| {
            let companion = f.companion_path(companion_suffix);
            SpliceCandidate {
                original: f.clone(),
                companion_present: companion.is_file(),
                companion,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn folder_preconditions() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            validate_folder(&dir.path().join("missing")),
            Err(BatchError::InvalidFolder(_))
        ));
        assert!(matches!(
            validate_folder(dir.path()),
            Err(BatchError::EmptyFolder(_))
        ));

        touch(dir.path(), "notes.txt");
        assert!(validate_folder(dir.path()).is_ok());

        let file = dir.path().join("notes.txt");
        assert!(matches!(
            validate_folder(&file),
            Err(BatchError::InvalidFolder(_))
        ));
    }

    #[test]
    fn discovers_allow_listed_files_in_name_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.mkv");
        touch(dir.path(), "a.mp4");
        touch(dir.path(), "song.mp3");
        touch(dir.path(), "readme.txt");
        fs::create_dir(dir.path().join("sub.mp4")).unwrap();

        let names: Vec<String> = discover_media(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mkv", "song.mp3"]);
    }

    #[test]
    fn candidates_skip_companions_and_audio() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp4");
        touch(dir.path(), "a_no_sub.mp4");
        touch(dir.path(), "b.mp4");
        touch(dir.path(), "song.m4a");

        let files = discover_media(dir.path()).unwrap();
        let candidates = splice_candidates(&files, "_no_sub");

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].original.file_name, "a.mp4");
        assert!(candidates[0].companion_present);
        assert_eq!(candidates[1].original.file_name, "b.mp4");
        assert!(!candidates[1].companion_present);
        assert_eq!(candidates[1].companion, dir.path().join("b_no_sub.mp4"));
    }
}
