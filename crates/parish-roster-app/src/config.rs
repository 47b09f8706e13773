//! Project configuration loaded from `.parish-roster/config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Directory holding configuration, roster data and the directory file.
pub const CONFIG_DIR: &str = ".parish-roster";
const CONFIG_FILE: &str = "config.toml";

/// Top-level project configuration loaded from `.parish-roster/config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Roster file settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Directory file settings.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Roster mutation settings.
    #[serde(default)]
    pub roster: RosterConfig,
}

impl ProjectConfig {
    /// Load configuration from `<root>/.parish-roster/config.toml`, falling back
    /// to defaults when the file does not exist.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is invalid.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let config_path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse {}", config_path.display()))
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    /// Returns an error on malformed TOML or empty paths.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            bail!("store.path must not be empty");
        }
        if self.directory.path.as_os_str().is_empty() {
            bail!("directory.path must not be empty");
        }
        Ok(())
    }

    /// Absolute (or root-relative) location of the roster file.
    pub fn store_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(CONFIG_DIR).join(&self.store.path)
    }

    /// Location of the directory file.
    pub fn directory_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(CONFIG_DIR).join(&self.directory.path)
    }
}

/// `[store]` block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Roster file, relative to `.parish-roster/`.
    #[serde(default = "StoreConfig::default_path")]
    pub path: PathBuf,
}

impl StoreConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("roster.json")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

/// `[directory]` block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// People/ministry/event listing, relative to `.parish-roster/`.
    #[serde(default = "DirectoryConfig::default_path")]
    pub path: PathBuf,
}

impl DirectoryConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("directory.toml")
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

/// `[roster]` block.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub struct RosterConfig {
    /// How replacements of already-replaced slots are written.
    #[serde(default)]
    pub replace_strategy: ReplaceStrategy,
}

/// How a replacement of an already-replaced slot is written.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceStrategy {
    /// Two updates keyed on the original volunteer. After the first rewrites
    /// `volunteerId`, the second matches nothing.
    #[default]
    Literal,
    /// A single update per replacement.
    Merged,
}
