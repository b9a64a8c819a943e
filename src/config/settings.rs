//! Application settings loading from config.toml
//!
//! The settings file supplies defaults for values the shop owner can later change
//! through the `settings` command, plus where credential documents live. Every key is
//! optional; a missing file means "use the defaults".

use crate::core::order_link::WhatsappLanguage;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Currency symbol used until one is saved
    pub currency: String,
    /// WhatsApp message language used until one is saved
    pub whatsapp_language: WhatsappLanguage,
    /// Directory or base URL holding `<username>.json` credential documents
    pub users_source: String,
    /// Whether to clear stale cache entries on start-up
    pub auto_cleanup: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: "৳".to_string(),
            whatsapp_language: WhatsappLanguage::Bn,
            users_source: "users".to_string(),
            auto_cleanup: true,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type (e.g. an unknown WhatsApp language)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `./config.toml`, falling back to defaults if the file is absent
pub fn load_default_config() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    if !path.exists() {
        debug!("No config.toml found, using default settings");
        return Ok(AppConfig::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            currency = "$"
            whatsapp_language = "en"
            users_source = "https://shop.example.com/users"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.currency, "$");
        assert_eq!(config.whatsapp_language, WhatsappLanguage::En);
        assert_eq!(config.users_source, "https://shop.example.com/users");
        assert!(config.auto_cleanup);
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "whatsapp_language = \"fr\"").unwrap();

        assert!(matches!(load_config(&path), Err(Error::Config { .. })));
    }
}
