//! Configuration module for WallSpan.
//!
//! This module provides configuration types, loading functionality, and file
//! watching for hot-reloading configuration changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod env;
pub mod types;
mod watcher;

use std::path::{Path, PathBuf};

pub use types::{
    ConfigError, DEFAULT_DOWNLOAD_QUALITY, DEFAULT_INTERVAL_SECS, DEFAULT_SEARCH_TERMS,
    RotationMode, WallspanConfig, config_paths, load_config, load_config_from_path, parse_config,
};
pub use watcher::watch_config_file;

use crate::constants::UNSPLASH_KEY_ENV;

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: WallspanConfig,
    /// `None` when no file exists and defaults are in use.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Wraps a configuration that did not come from a file.
    #[must_use]
    pub fn from_config(config: WallspanConfig) -> Self { Self { config, path: None } }

    /// Resolves the Unsplash access key.
    ///
    /// `apiKey` wins, then the env file named by `apiKeys`, then the
    /// `UNSPLASH_ACCESS_KEY` environment variable.
    #[must_use]
    pub fn access_key(&self) -> Option<String> {
        let inline = self.config.api_key.trim();
        if !inline.is_empty() {
            return Some(inline.to_string());
        }

        let config_dir = self.path.as_deref().and_then(Path::parent).unwrap_or(Path::new("."));
        env::load_access_key(&self.config.api_keys, config_dir).or_else(|| {
            std::env::var(UNSPLASH_KEY_ENV).ok().filter(|key| !key.trim().is_empty())
        })
    }
}

/// Loads the configuration.
///
/// With `custom_path` that file must exist. Otherwise the default locations
/// are searched and defaults are used when none exists.
///
/// # Errors
///
/// Returns an error if a configuration file exists but cannot be read or parsed.
pub fn load(custom_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let result = custom_path.map_or_else(load_config, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(LoadedConfig { config, path: Some(path) })
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(LoadedConfig::default())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_api_key_wins() {
        let loaded = LoadedConfig::from_config(WallspanConfig {
            api_key: "  inline  ".to_string(),
            api_keys: "/nonexistent/.env".to_string(),
            ..Default::default()
        });
        assert_eq!(loaded.access_key().as_deref(), Some("inline"));
    }

    #[test]
    fn test_api_key_from_env_file_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "UNSPLASH_ACCESS_KEY=from_env_file\n").unwrap();

        let loaded = LoadedConfig {
            config: WallspanConfig { api_keys: ".env".to_string(), ..Default::default() },
            path: Some(dir.path().join("config.jsonc")),
        };
        assert_eq!(loaded.access_key().as_deref(), Some("from_env_file"));
    }

    #[test]
    fn test_load_custom_path_must_exist() {
        let result = load(Some(Path::new("/nonexistent/wallspan.jsonc")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallspan.jsonc");
        std::fs::write(&path, r#"{ "mode": "individual" }"#).unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.config.mode, RotationMode::Individual);
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }
}
