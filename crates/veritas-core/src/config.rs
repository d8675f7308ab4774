//! Extension configuration persistence.
//!
//! The only setting is the base URL of the analysis service. The store
//! publishes every change on a `watch` channel so the background relay can
//! hold a receiver instead of reading the file on each request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Placeholder service address; deployments override it.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Sub-path of the analysis endpoint under the base URL.
pub const ANALYZE_PATH: &str = "/analyze_text";

const CONFIG_FILE: &str = "config.json";

/// Persisted extension configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde(default, rename = "apiBase", skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ExtensionConfig {
    /// Configuration written by the install hook.
    pub fn installed() -> Self {
        Self {
            api_base: Some(DEFAULT_API_BASE.into()),
        }
    }

    /// Base URL to use, falling back to the default when unset or blank.
    pub fn resolved_api_base(&self) -> &str {
        match self.api_base.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => base.trim_end_matches('/'),
            _ => DEFAULT_API_BASE,
        }
    }

    /// Full URL of the analysis endpoint.
    pub fn analyze_endpoint(&self) -> String {
        format!("{}{}", self.resolved_api_base(), ANALYZE_PATH)
    }
}

/// Process-wide configuration, backed by `config.json` in the data directory.
pub struct ConfigStore {
    /// None for stores that never touch disk.
    config_path: Option<PathBuf>,
    tx: watch::Sender<ExtensionConfig>,
}

impl ConfigStore {
    /// Load config from `<config_dir>/config.json`, or start empty.
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join(CONFIG_FILE);
        let config: ExtensionConfig = std::fs::read_to_string(&config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        let (tx, _) = watch::channel(config);
        Self {
            config_path: Some(config_path),
            tx,
        }
    }

    /// A store that only lives in memory.
    pub fn in_memory(config: ExtensionConfig) -> Self {
        let (tx, _) = watch::channel(config);
        Self {
            config_path: None,
            tx,
        }
    }

    /// Whether a config file exists on disk yet.
    pub fn is_persisted(&self) -> bool {
        self.config_path.as_deref().is_some_and(Path::exists)
    }

    /// Copy of the current configuration.
    pub fn current(&self) -> ExtensionConfig {
        self.tx.borrow().clone()
    }

    /// Receiver that always sees the latest configuration.
    pub fn subscribe(&self) -> watch::Receiver<ExtensionConfig> {
        self.tx.subscribe()
    }

    /// Install hook: unconditionally seed the default base URL.
    pub fn seed_defaults(&self) -> Result<()> {
        self.replace(ExtensionConfig::installed())?;
        info!("Seeded extension config with apiBase={}", DEFAULT_API_BASE);
        Ok(())
    }

    /// Set the analysis service base URL.
    pub fn set_api_base(&self, api_base: &str) -> Result<()> {
        let trimmed = api_base.trim();
        if trimmed.is_empty() {
            return Err(Error::Config("apiBase must not be empty".into()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::Config(format!(
                "apiBase must be an http(s) URL, got {}",
                trimmed
            )));
        }
        self.replace(ExtensionConfig {
            api_base: Some(trimmed.to_string()),
        })?;
        info!("apiBase set to {}", trimmed);
        Ok(())
    }

    fn replace(&self, config: ExtensionConfig) -> Result<()> {
        self.save(&config)?;
        self.tx.send_replace(config);
        Ok(())
    }

    fn save(&self, config: &ExtensionConfig) -> Result<()> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(path, json).map_err(|e| {
            warn!("Failed to write {}: {}", path.display(), e);
            Error::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_base_resolves_to_default() {
        let config = ExtensionConfig::default();
        assert_eq!(config.resolved_api_base(), DEFAULT_API_BASE);
        assert_eq!(
            config.analyze_endpoint(),
            "http://localhost:8000/analyze_text"
        );
    }

    #[test]
    fn test_blank_base_resolves_to_default() {
        let config = ExtensionConfig {
            api_base: Some("   ".into()),
        };
        assert_eq!(config.resolved_api_base(), DEFAULT_API_BASE);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ExtensionConfig {
            api_base: Some("https://veritas.example/api/".into()),
        };
        assert_eq!(
            config.analyze_endpoint(),
            "https://veritas.example/api/analyze_text"
        );
    }

    #[test]
    fn test_wire_name_is_camel_case() {
        let json = serde_json::to_string(&ExtensionConfig::installed()).unwrap();
        assert_eq!(json, r#"{"apiBase":"http://localhost:8000"}"#);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path());
        assert!(!store.is_persisted());
        assert_eq!(store.current(), ExtensionConfig::default());
    }

    #[test]
    fn test_seed_defaults_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path());
        store.seed_defaults().unwrap();
        assert!(store.is_persisted());

        let reloaded = ConfigStore::load(dir.path());
        assert_eq!(reloaded.current(), ExtensionConfig::installed());
    }

    #[test]
    fn test_seed_defaults_overwrites_user_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path());
        store.set_api_base("https://custom.example").unwrap();
        store.seed_defaults().unwrap();
        assert_eq!(store.current().resolved_api_base(), DEFAULT_API_BASE);
    }

    #[test]
    fn test_set_api_base_notifies_subscribers() {
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        let rx = store.subscribe();
        store.set_api_base("https://veritas.example").unwrap();
        assert_eq!(rx.borrow().resolved_api_base(), "https://veritas.example");
    }

    #[test]
    fn test_set_api_base_rejects_garbage() {
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        assert!(store.set_api_base("").is_err());
        assert!(store.set_api_base("ftp://nope").is_err());
        assert_eq!(store.current(), ExtensionConfig::default());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        let store = ConfigStore::load(dir.path());
        assert_eq!(store.current().resolved_api_base(), DEFAULT_API_BASE);
    }
}
