//! Configuration manager for loading and saving application settings
//!
//! This module provides functionality to load and save configuration to
//! %APPDATA%\Pausa\config.json with atomic writes to prevent corruption.

use crate::config::models::AppConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the path to the configuration file
    ///
    /// Returns: %APPDATA%\Pausa\config.json (falls back to the working
    /// directory when APPDATA is unset, e.g. on Linux dev machines)
    pub fn get_config_path() -> PathBuf {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("Pausa").join("config.json")
    }

    /// Load configuration from the default location
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default
    /// configuration instead of failing.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(config_path)?;

        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(config: &AppConfig) -> Result<()> {
        Self::save_to(&Self::get_config_path(), config)
    }

    /// Save configuration to an explicit path with an atomic write
    ///
    /// Writes to a temporary file in the target directory and persists it
    /// over the destination so a crash mid-write cannot corrupt the config.
    pub fn save_to(config_path: &Path, config: &AppConfig) -> Result<()> {
        let config_dir = config_path.parent().ok_or_else(|| {
            crate::error::PausaError::ConfigError(crate::error::StringError::new(
                "Invalid config path",
            ))
        })?;
        std::fs::create_dir_all(config_dir)?;

        let json = serde_json::to_string_pretty(config)?;

        let temp_file = tempfile::NamedTempFile::new_in(config_dir)?;
        std::fs::write(temp_file.path(), json)?;
        temp_file.persist(config_path).map_err(|e| {
            // Preserve error chain by wrapping the source error
            crate::error::PausaError::ConfigError(Box::new(e))
        })?;

        info!("Configuration saved successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        let path = ConfigManager::get_config_path();
        assert!(path.to_string_lossy().contains("Pausa"));
        assert!(path.to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.durations.break_interval = 1234;
        config.update.update_version = "2.0".to_string();

        ConfigManager::save_to(&path, &config).unwrap();
        let loaded = ConfigManager::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_corrupt_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let config = ConfigManager::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        ConfigManager::save_to(&path, &AppConfig::default()).unwrap();
        assert!(path.exists());
    }
}
