use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use strsim::jaro_winkler;

/// Keys understood in `config.toml`.
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    ("storage", "`local` for local files, anything else for Google Sheets"),
    ("sheet_id", "spreadsheet id (Google Sheets)"),
    ("sheet_name", "worksheet tab name, default `Log`"),
    ("credentials", "path to a service-account JSON key"),
    ("log_dir", "directory of the yearly log files"),
    ("strict_menus", "re-prompt on invalid menu choices instead of defaulting"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Print `value` as pretty JSON, or run `text` to print it for humans.
pub fn emit<T: Serialize + ?Sized>(fmt: OutputFmt, value: &T, text: impl FnOnce()) -> Result<()> {
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Text => text(),
    }
    Ok(())
}

/// Flat string map persisted as TOML.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// `<config_dir>/cali/config.toml`
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("cali").join("config.toml"))
            .context("Could not determine config directory")
    }

    /// The user's config, or an empty one when there is no config directory
    /// or no file yet.
    pub fn load_default() -> Result<Self> {
        match dirs::config_dir() {
            Some(_) => Self::load(&Self::path()?),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let map = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(Self { map })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string(&self.map)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to save config to {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }
}

/// Returns the key itself if it is a known config key.
pub fn known_config_key(key: &str) -> Option<&'static str> {
    CONFIG_KEYS
        .iter()
        .map(|(k, _)| *k)
        .find(|k| *k == key)
}

/// Closest known config key for a misspelled `key`, if any is close.
pub fn suggest_config_key(key: &str) -> Option<&'static str> {
    CONFIG_KEYS
        .iter()
        .map(|(k, _)| (*k, jaro_winkler(key, k)))
        .filter(|(_, score)| *score >= 0.85)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
}
