//! TOML-backed settings and contacts for the CLI.
//!
//! The core treats these as plain configuration handed over at startup;
//! the file format lives entirely on the CLI side.
//!
//! Configuration is stored at `~/.config/lifeline/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use lifeline_core::{ConfigError, Contact, EmergencySettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Optional remote composer endpoint; local templates when unset.
    #[serde(default)]
    pub compose_endpoint: Option<String>,
    #[serde(default)]
    pub settings: EmergencySettings,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl CliConfig {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lifeline")
            .join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Missing file means defaults, not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|err| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        toml::from_str(&raw).map_err(|err| ConfigError::ParseFailed(err.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        }
        let raw =
            toml::to_string_pretty(self).map_err(|err| ConfigError::ParseFailed(err.to_string()))?;
        fs::write(path, raw).map_err(|err| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_core::TimeUnit;
    use uuid::Uuid;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.settings, EmergencySettings::default());
        assert!(config.contacts.is_empty());
        assert!(config.compose_endpoint.is_none());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = CliConfig::default();
        config.settings.check_in_interval_value = 2;
        config.settings.check_in_interval_unit = TimeUnit::Hours;
        config.settings.auto_call_police = false;
        config.contacts.push(Contact {
            id: Uuid::new_v4(),
            name: "Mom".to_string(),
            phone: Some("555-0101".to_string()),
            email: None,
            notify_on_warning: true,
            notify_on_emergency: true,
            enable_sms: true,
            enable_email: false,
        });
        config.compose_endpoint = Some("http://localhost:8080/compose".to_string());
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.settings, config.settings);
        assert_eq!(loaded.contacts, config.contacts);
        assert_eq!(loaded.compose_endpoint, config.compose_endpoint);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            CliConfig::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
