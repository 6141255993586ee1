use crate::feeling_entry::Mood;
use crate::journal_state::DEFAULT_STORAGE_KEY;
use crate::render::DEFAULT_CHAR_LIMIT;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "feelings-journal";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_path: PathBuf,
    pub storage_key: String,
    pub char_limit: usize,
    pub default_mood: Mood,
    pub dark_mode: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: data_dir()
                .map(|d| d.join("store.json"))
                .unwrap_or_else(|| PathBuf::from("feelings_store.json")),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            char_limit: DEFAULT_CHAR_LIMIT,
            default_mood: Mood::Happy,
            dark_mode: false,
            log_level: "info".to_string(),
        }
    }
}

pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR))
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

impl Config {
    /// Missing file gives defaults. A file that cannot be read or parsed also
    /// gives defaults, with the reason returned for logging once a
    /// subscriber is installed.
    pub fn load(path: &Path) -> (Self, Option<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("error parsing {}: {e}", path.display())),
                ),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Self::default(), None),
            Err(e) => (
                Self::default(),
                Some(format!("error reading {}: {e}", path.display())),
            ),
        }
    }
}
