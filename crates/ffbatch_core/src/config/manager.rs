//! Loading and saving `settings.toml`.
//!
//! The file is always rewritten through a sibling temp file and a rename.
//! Single-section updates go through `toml_edit`, so hand-written comments
//! and the other sections survive untouched.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use super::settings::{ConfigSection, Settings};

const HEADER: &str = "# ffbatch settings\n";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Cannot edit config: {0}")]
    Edit(#[from] toml_edit::TomlError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file and the in-memory [`Settings`].
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path`; nothing is read until `load_or_create`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until `update_section` or `save`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Read the settings file, writing defaults when it does not exist.
    ///
    /// A file with missing or unknown sections is rewritten in full.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        let Some(doc) = self.read_document()? else {
            self.settings = Settings::default();
            return self.save();
        };

        self.settings = toml::from_str(&doc.to_string())?;
        if !has_exact_sections(&doc) {
            self.save()?;
        }
        Ok(())
    }

    /// Create the logs and temp directories.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.logs_folder())?;
        fs::create_dir_all(self.settings.paths.temp_dir())?;
        Ok(())
    }

    /// Rewrite the whole file from the in-memory settings.
    pub fn save(&self) -> ConfigResult<()> {
        let mut doc = DocumentMut::new();
        for &section in ConfigSection::all() {
            let mut table = self.section_table(section)?;
            table
                .decor_mut()
                .set_prefix(format!("\n{}\n", section.comment()));
            doc.insert(section.table_name(), Item::Table(table));
        }
        self.write(&format!("{}{}", HEADER, doc))?;
        Ok(())
    }

    /// Replace one section on disk with its in-memory value.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut doc = self.read_document()?.unwrap_or_default();
        let mut table = self.section_table(section)?;

        let name = section.table_name();
        if let Some(existing) = doc.get(name).and_then(Item::as_table) {
            *table.decor_mut() = existing.decor().clone();
            table.set_position(existing.position());
        }
        doc.insert(name, Item::Table(table));

        self.write(&doc.to_string())?;
        Ok(())
    }

    fn read_document(&self) -> ConfigResult<Option<DocumentMut>> {
        match fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(Some(content.parse()?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn section_table(&self, section: ConfigSection) -> ConfigResult<Table> {
        let s = &self.settings;
        let body = match section {
            ConfigSection::Paths => toml::to_string(&s.paths)?,
            ConfigSection::Tools => toml::to_string(&s.tools)?,
            ConfigSection::Logging => toml::to_string(&s.logging)?,
            ConfigSection::Encoding => toml::to_string(&s.encoding)?,
            ConfigSection::Splice => toml::to_string(&s.splice)?,
            ConfigSection::Output => toml::to_string(&s.output)?,
        };
        let doc: DocumentMut = body.parse()?;
        let mut table = doc.as_table().clone();
        table.set_position(None);
        Ok(table)
    }

    /// Write via `<name>.tmp` + rename in the same directory.
    fn write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_name = self.config_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.config_path)
    }
}

/// Every known section present and nothing else.
fn has_exact_sections(doc: &DocumentMut) -> bool {
    let known = ConfigSection::all();
    doc.iter()
        .all(|(key, _)| known.iter().any(|s| s.table_name() == key))
        && known.iter().all(|s| doc.contains_key(s.table_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn load(path: &Path) -> ConfigManager {
        let mut manager = ConfigManager::new(path);
        manager.load_or_create().unwrap();
        manager
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".config").join("settings.toml");

        load(&path);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(HEADER));
        assert!(content.contains("# Splice mode"));
        assert!(content.contains("[splice]"));
        assert!(content.contains("companion_suffix = \"_no_sub\""));
        assert!(!path.with_extension("toml.tmp").exists());

        assert_eq!(load(&path).settings().tools.ffmpeg, "ffmpeg");
    }

    #[test]
    fn partial_file_keeps_values_and_gains_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[tools]\nffmpeg = \"/usr/local/bin/ffmpeg\"\n").unwrap();

        let manager = load(&path);
        assert_eq!(manager.settings().tools.ffmpeg, "/usr/local/bin/ffmpeg");
        assert_eq!(manager.settings().tools.ffprobe, "ffprobe");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[logging]"));
        assert!(content.contains("/usr/local/bin/ffmpeg"));
    }

    #[test]
    fn complete_file_is_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        load(&path);

        let edited = fs::read_to_string(&path)
            .unwrap()
            .replace("# ffbatch settings", "# my own notes");
        fs::write(&path, &edited).unwrap();

        load(&path);
        assert_eq!(fs::read_to_string(&path).unwrap(), edited);
    }

    #[test]
    fn update_section_keeps_other_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        load(&path);
        let with_note = fs::read_to_string(&path)
            .unwrap()
            .replace("[tools]", "# pinned build\n[tools]");
        fs::write(&path, with_note).unwrap();

        let mut manager = load(&path);
        manager.settings_mut().paths.last_folder = "/media/show".to_string();
        manager.update_section(ConfigSection::Paths).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("last_folder = \"/media/show\""));
        assert!(content.contains("# pinned build"));
        assert!(content.contains("# Temp and log directories"));
        assert_eq!(load(&path).settings().paths.last_folder, "/media/show");
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[tools\n").unwrap();

        let mut manager = ConfigManager::new(&path);
        assert!(matches!(manager.load_or_create(), Err(ConfigError::Edit(_))));
    }
}
