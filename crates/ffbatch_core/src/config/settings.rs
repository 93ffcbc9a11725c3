//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Default encoder arguments.
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// Splice pipeline settings.
    #[serde(default)]
    pub splice: SpliceSettings,

    /// Output naming and placement.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Path configuration for temp artifacts and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for temporary splice artifacts.
    ///
    /// Empty means `<system temp>/ffbatch`.
    #[serde(default)]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last folder a batch was run on.
    #[serde(default)]
    pub last_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: String::new(),
            logs_folder: default_logs_folder(),
            last_folder: String::new(),
        }
    }
}

impl PathSettings {
    /// Resolve the temp root, falling back to the system temp directory.
    pub fn temp_dir(&self) -> PathBuf {
        if self.temp_root.trim().is_empty() {
            std::env::temp_dir().join("ffbatch")
        } else {
            PathBuf::from(&self.temp_root)
        }
    }
}

/// External tool executables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Encoder executable (name on PATH or absolute path).
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// Probe executable (name on PATH or absolute path).
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Prefix log feed lines with `[HH:MM:SS]`.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Number of tool output lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Also log each command's argument vector as JSON.
    #[serde(default)]
    pub show_command_json: bool,

    /// Write a per-run log file to the logs folder.
    #[serde(default = "default_true")]
    pub write_run_log: bool,

    /// How often the front end drains the log feed, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            error_tail: default_error_tail(),
            show_command_json: false,
            write_run_log: true,
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Encoder defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Encoder arguments used when the operator supplies none.
    #[serde(default = "default_encoder_args")]
    pub default_args: String,
}

fn default_encoder_args() -> String {
    "-c:v libx264 -b:v 8000k -crf 23 -y".to_string()
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            default_args: default_encoder_args(),
        }
    }
}

/// Splice pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceSettings {
    /// Suffix identifying the no-subtitle companion (`name_no_sub.ext`).
    #[serde(default = "default_companion_suffix")]
    pub companion_suffix: String,

    /// Prefix for spliced output names.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Codec for the extracted and remuxed audio track.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Bitrate for the extracted and remuxed audio track.
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Container extension for the extracted audio artifact.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
}

fn default_companion_suffix() -> String {
    "_no_sub".to_string()
}

fn default_output_prefix() -> String {
    "spliced_".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_audio_extension() -> String {
    "m4a".to_string()
}

impl Default for SpliceSettings {
    fn default() -> Self {
        Self {
            companion_suffix: default_companion_suffix(),
            output_prefix: default_output_prefix(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            audio_extension: default_audio_extension(),
        }
    }
}

/// Output placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Name of the output subdirectory.
    #[serde(default = "default_ok_subdir")]
    pub ok_subdir: String,

    /// Place outputs of every mode in the subdirectory (splice always does).
    #[serde(default)]
    pub use_ok_subdir: bool,
}

fn default_ok_subdir() -> String {
    "OK".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            ok_subdir: default_ok_subdir(),
            use_ok_subdir: false,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Tools,
    Logging,
    Encoding,
    Splice,
    Output,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Logging => "logging",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Splice => "splice",
            ConfigSection::Output => "output",
        }
    }

    /// All sections in file order.
    pub fn all() -> &'static [ConfigSection] {
        &[
            ConfigSection::Paths,
            ConfigSection::Tools,
            ConfigSection::Logging,
            ConfigSection::Encoding,
            ConfigSection::Splice,
            ConfigSection::Output,
        ]
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Temp and log directories",
            ConfigSection::Tools => "# External tool executables",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Encoding => "# Default encoder arguments",
            ConfigSection::Splice => "# Splice mode (head/tail from original, middle from companion)",
            ConfigSection::Output => "# Output placement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[splice]"));
        assert!(toml.contains("companion_suffix"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[tools]\nffmpeg = \"/opt/ffmpeg/bin/ffmpeg\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert_eq!(parsed.tools.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        // Defaults applied for missing
        assert_eq!(parsed.tools.ffprobe, "ffprobe");
        assert_eq!(parsed.splice.companion_suffix, "_no_sub");
        assert_eq!(parsed.output.ok_subdir, "OK");
    }

    #[test]
    fn empty_temp_root_falls_back_to_system_temp() {
        let paths = PathSettings::default();
        assert!(paths.temp_dir().ends_with("ffbatch"));

        let custom = PathSettings {
            temp_root: "/scratch/tmp".to_string(),
            ..Default::default()
        };
        assert_eq!(custom.temp_dir(), PathBuf::from("/scratch/tmp"));
    }
}
