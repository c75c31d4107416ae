//! Configuration file
//!
//! Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [timing]
//! tolerance = 100
//!
//! [hardware]
//! variant = "mt8812"
//!
//! [keymap]
//! path = "keymap.toml"
//!
//! [joystick]
//! forward = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use c64_matrix::{KeyTranslationTable, KeymapFile, Variant};
use irkey_protocol::{Timing, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Pulse timing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Match window (±µs) applied to every nominal duration
    #[serde(default = "default_tolerance")]
    pub tolerance: u32,
}

fn default_tolerance() -> u32 {
    DEFAULT_TOLERANCE
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Crosspoint switch part ("mt8808" or "mt8812")
    #[serde(default)]
    pub variant: Variant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Keymap file; relative paths are resolved against the config file.
    /// The built-in table is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoystickConfig {
    /// Hand joystick events to the joystick sink
    #[serde(default = "default_true")]
    pub forward: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            forward: default_true(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
    #[serde(default)]
    pub joystick: JoystickConfig,
    /// Directory relative keymap paths resolve against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("irkey-c64")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn timing(&self) -> Timing {
        Timing::new(self.timing.tolerance)
    }

    /// Resolved keymap file path, if one is configured
    pub fn keymap_path(&self) -> Option<PathBuf> {
        let path = self.keymap.path.as_ref()?;
        match &self.base_dir {
            Some(dir) if path.is_relative() => Some(dir.join(path)),
            _ => Some(path.clone()),
        }
    }

    /// Load the configured translation table, or the built-in one
    pub fn load_keymap(&self) -> anyhow::Result<KeyTranslationTable> {
        match self.keymap_path() {
            Some(path) => load_keymap_file(&path),
            None => Ok(KeyTranslationTable::builtin()),
        }
    }
}

/// Load and validate a keymap file
pub fn load_keymap_file(path: &Path) -> anyhow::Result<KeyTranslationTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading keymap {}", path.display()))?;
    parse_keymap(&content).with_context(|| format!("loading keymap {}", path.display()))
}

pub fn parse_keymap(content: &str) -> anyhow::Result<KeyTranslationTable> {
    let file: KeymapFile = toml::from_str(content)?;
    Ok(KeyTranslationTable::from_file(file)?)
}

/// Render a table in keymap file format
pub fn keymap_to_toml(table: &KeyTranslationTable) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(&KeymapFile::from(table))?)
}
