//! Configuration file handling

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tagsift_selector::JsonFileStorage;
use tagsift_types::{EngineConfig, SelectorConfig};

/// Contents of `tagsift.toml`; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub selector: SelectorConfig,
}

impl Config {
    /// Load from `path`, or fall back to defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Where the persisted selection lives
    pub fn storage_path(&self) -> Result<PathBuf> {
        self.selector
            .storage_path
            .clone()
            .or_else(JsonFileStorage::default_path)
            .context("could not determine a home directory for the selection store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsift_types::{CatalogChoice, EmptyResultPolicy};

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.selector.notice_ms, 3000);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            catalog = "minimal"
            on_empty_result = "silent"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.catalog, CatalogChoice::Minimal);
        assert_eq!(config.engine.on_empty_result, EmptyResultPolicy::Silent);
        assert_eq!(config.engine.replay_delay_ms, 1000);
        assert_eq!(config.selector.notice_ms, 3000);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagsift.toml");
        fs::write(
            &path,
            "[selector]\nnotice_ms = 500\nstorage_path = \"/tmp/store.json\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.selector.notice_ms, 500);
        assert_eq!(
            config.storage_path().unwrap(),
            PathBuf::from("/tmp/store.json")
        );
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagsift.toml");
        fs::write(&path, "[engine]\ncatalog = \"huge\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
