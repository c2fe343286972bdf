use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::input::{Keymap, KeymapConfig, Platform};

pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Indentation as written in a config file: a width, or a sample string
/// whose length is the width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndentSpec {
    Width(usize),
    Unit(String),
}

impl IndentSpec {
    pub fn width(&self) -> usize {
        match self {
            Self::Width(width) => *width,
            Self::Unit(unit) => unit.chars().count(),
        }
    }
}

/// Settings as read from a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<IndentSpec>,
    #[serde(alias = "keyMap")]
    pub keymap: KeymapConfig,
}

impl Config {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            indent: other.indent.clone().or_else(|| self.indent.clone()),
            keymap: self.keymap.union(&other.keymap),
        }
    }

    /// Editing options described by this config.
    pub fn options(&self) -> Result<Options, Error> {
        self.indent
            .as_ref()
            .map_or(Ok(Options::default()), |spec| Options::with_indent_width(spec.width()))
    }

    /// The binding table described by this config.
    pub fn keymap(&self, platform: Platform) -> Result<Keymap, Error> {
        Keymap::build(&self.keymap, platform)
    }
}

/// Options consumed by the action engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    indent_unit: String,
}

impl Options {
    /// Indent with `width` spaces per level.
    pub fn with_indent_width(width: usize) -> Result<Self, Error> {
        if width == 0 {
            return Err(Error::InvalidIndent);
        }
        Ok(Self {
            indent_unit: " ".repeat(width),
        })
    }

    /// One level of indentation.
    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent_unit: " ".repeat(DEFAULT_INDENT_WIDTH),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("marktype").join("config.json");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("marktype")
                .join("config.json");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("marktype").join("config.json");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("marktype")
                .join("config.json");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".marktype.json")
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Action;
    use tempfile::tempdir;

    #[test]
    fn test_default_options_indent_four_spaces() {
        assert_eq!(Options::default().indent_unit(), "    ");
    }

    #[test]
    fn test_zero_width_indent_is_rejected() {
        assert_eq!(Options::with_indent_width(0), Err(Error::InvalidIndent));
    }

    #[test]
    fn test_indent_spec_from_number_or_string() {
        let config: Config = serde_json::from_str(r#"{"indent": 2}"#).unwrap();
        assert_eq!(config.options().unwrap().indent_unit(), "  ");
        let config: Config = serde_json::from_str(r#"{"indent": "\t"}"#).unwrap();
        assert_eq!(config.options().unwrap().indent_unit(), " ");
    }

    #[test]
    fn test_config_union_merges_cli_over_file() {
        let file: Config =
            serde_json::from_str(r#"{"indent": 2, "keymap": {"indent": "Ctrl+i"}}"#).unwrap();
        let cli: Config = serde_json::from_str(r#"{"indent": 8}"#).unwrap();
        let merged = file.union(&cli);
        assert_eq!(merged.indent, Some(IndentSpec::Width(8)));
        assert_eq!(merged.keymap.combos_for(Action::Indent), vec!["Ctrl+i"]);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config {
            indent: Some(IndentSpec::Width(3)),
            ..Config::default()
        };
        config.keymap.disable(Action::InlineWrap);

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);

        clear_config(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
