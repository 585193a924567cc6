use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::types::Language;

/// Top-level configuration for the dialog engine.
///
/// Loaded from a TOML file; every section falls back to defaults so a
/// partial file is always usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub follow_up: FollowUpConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or unparseable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.locator.search_radius_km <= 0.0 {
            return Err(EngineError::Config(
                "locator.search_radius_km must be positive".to_string(),
            ));
        }
        if self.locator.max_options == 0 {
            return Err(EngineError::Config(
                "locator.max_options must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// General engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Language used before any preference is detected.
    pub default_language: Language,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_language: Language::En,
        }
    }
}

/// Nearest-service search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Bounded search window; candidates beyond this distance are not
    /// suggested at all.
    pub search_radius_km: f64,
    /// Maximum candidates presented for selection.
    pub max_options: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 10.0,
            max_options: 3,
        }
    }
}

/// Follow-up scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpConfig {
    /// Delay between a completed interaction and its check-in message.
    pub delay_hours: u64,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self { delay_hours: 24 }
    }
}

/// Session router settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle per-user session locks are evicted after this long.
    pub idle_eviction_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_eviction_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.locator.search_radius_km, 10.0);
        assert_eq!(config.locator.max_options, 3);
        assert_eq!(config.follow_up.delay_hours, 24);
        assert_eq!(config.session.idle_eviction_minutes, 30);
        assert_eq!(config.general.default_language, Language::En);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [locator]
            search_radius_km = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(config.locator.search_radius_km, 5.0);
        assert_eq!(config.locator.max_options, 3);
        assert_eq!(config.follow_up.delay_hours, 24);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.follow_up.delay_hours = 2;
        config.general.default_language = Language::Rw;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.follow_up.delay_hours, 2);
        assert_eq!(loaded.general.default_language, Language::Rw);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = EngineConfig::load_or_default(&path);
        assert_eq!(config.locator.max_options, 3);
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[locator]\nsearch_radius_km = 0.0\n").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn test_zero_options_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[locator]\nmax_options = 0\n").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }
}
