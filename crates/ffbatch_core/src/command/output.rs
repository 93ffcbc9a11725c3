//! Output path rule.
//!
//! `name.ext` becomes `name_c.ext` / `name_s.ext` / `name_w.ext`, or
//! `spliced_name.ext` for splice mode. Splice outputs always go to the `OK`
//! subdirectory; other modes only when configured.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::models::{MediaFile, OperationMode};
use crate::orchestrator::{StepError, StepResult};

/// Derive the output file name for `file_name` under `mode`.
///
/// Names without an extension (or dot-files) get the suffix at the end.
pub fn output_file_name(file_name: &str, mode: OperationMode, splice_prefix: &str) -> String {
    if mode.is_splice() {
        return format!("{}{}", splice_prefix, file_name);
    }

    let suffix = mode.output_suffix();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}{}.{}", stem, suffix, ext),
        _ => format!("{}{}", file_name, suffix),
    }
}

/// Directory the output of `input` lands in.
pub fn output_dir(input: &Path, mode: OperationMode, settings: &Settings) -> PathBuf {
    let folder = input.parent().unwrap_or_else(|| Path::new("."));
    if mode.forces_ok_subdir() || settings.output.use_ok_subdir {
        folder.join(&settings.output.ok_subdir)
    } else {
        folder.to_path_buf()
    }
}

/// Full output path, without touching the filesystem.
pub fn plan_output_path(file: &MediaFile, mode: OperationMode, settings: &Settings) -> PathBuf {
    output_dir(&file.path, mode, settings).join(output_file_name(
        &file.file_name,
        mode,
        &settings.splice.output_prefix,
    ))
}

/// Full output path, creating the output directory if needed.
pub fn prepare_output_path(
    file: &MediaFile,
    mode: OperationMode,
    settings: &Settings,
) -> StepResult<PathBuf> {
    let path = plan_output_path(file, mode, settings);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| StepError::io_error("creating output directory", e))?;
    }
    Ok(path)
}
