use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const MODEL_ENV: &str = "BLUEPRINT_MODEL";
pub const API_KEY_ENV: &str = "BLUEPRINT_API_KEY";

/// Resolve the global settings directory (~/.blueprint/).
pub fn settings_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".blueprint")
}

pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

/// Model settings as stored on disk. Empty strings mean "not set".
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// `<provider>:<model>`
    pub model: String,
    pub api_key: String,
}

impl Settings {
    /// A missing file is not an error; a malformed one is.
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_env() -> Self {
        Self {
            model: std::env::var(MODEL_ENV).unwrap_or_default(),
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
        }
    }

    /// Overlay non-empty values from `other`.
    pub fn merge(mut self, other: Settings) -> Self {
        if !other.model.trim().is_empty() {
            self.model = other.model;
        }
        if !other.api_key.trim().is_empty() {
            self.api_key = other.api_key;
        }
        self
    }

    pub fn model(&self) -> Option<&str> {
        Some(self.model.trim()).filter(|m| !m.is_empty())
    }
}

/// File < environment < flags.
pub fn layered(file: Settings, env: Settings, flags: Settings) -> Settings {
    file.merge(env).merge(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(model: &str, key: &str) -> Settings {
        Settings {
            model: model.to_string(),
            api_key: key.to_string(),
        }
    }

    #[test]
    fn later_layers_win_when_set() {
        let merged = layered(s("openai:gpt-4o", "file-key"), s("", "env-key"), s("anthropic:claude", ""));
        assert_eq!(merged, s("anthropic:claude", "env-key"));
    }

    #[test]
    fn empty_layers_change_nothing() {
        let merged = layered(s("", ""), s(" ", ""), Settings::default());
        assert_eq!(merged.model(), None);
    }

    #[test]
    fn missing_file_reads_as_default() {
        let settings = Settings::read_from(Path::new("/definitely/not/here/settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
