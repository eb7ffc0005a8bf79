//! Application settings loading from config.toml
//!
//! The settings file names the household profile used when a Discord user has
//! no explicit mapping, and may list helpers to seed into an empty registry on
//! first run.

use crate::core::helper::{HelperRole, PaymentType};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_PROFILE: &str = "default";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Profile used for authors without a `HOUSEHOLD_PROFILE_n` mapping
    #[serde(default = "default_profile")]
    pub default_profile: String,
    /// Helpers to create when the registry of the default profile is empty
    #[serde(default)]
    pub helpers: Vec<HelperSeed>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            helpers: Vec::new(),
        }
    }
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

/// Configuration for a single seeded helper
#[derive(Debug, Deserialize, Clone)]
pub struct HelperSeed {
    /// Display name
    pub name: String,
    /// Maid, Milkman, or Other
    #[serde(default = "default_role")]
    pub role: HelperRole,
    /// Monthly salary, or the day rate for daily-paid helpers
    #[serde(default)]
    pub monthly_salary: f64,
    /// Price per liter pre-filled for this milkman's entries
    #[serde(default)]
    pub default_price_per_liter: f64,
    /// Monthly or Daily
    #[serde(default)]
    pub payment_type: PaymentType,
}

const fn default_role() -> HelperRole {
    HelperRole::Maid
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })
}

/// Loads settings from `./config.toml`, or returns the defaults when the file
/// does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::info!("No config.toml found, using default settings");
        return Ok(Settings::default());
    }
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            default_profile = "singhi"

            [[helpers]]
            name = "Sunita"
            role = "Maid"
            monthly_salary = 3000.0
            payment_type = "Monthly"

            [[helpers]]
            name = "Ramesh"
            role = "Milkman"
            default_price_per_liter = 56.0
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.default_profile, "singhi");
        assert_eq!(settings.helpers.len(), 2);
        assert_eq!(settings.helpers[0].monthly_salary, 3000.0);
        assert_eq!(settings.helpers[1].role, HelperRole::Milkman);
        assert_eq!(settings.helpers[1].default_price_per_liter, 56.0);
        assert_eq!(settings.helpers[1].payment_type, PaymentType::Monthly);
    }

    #[test]
    fn test_parse_empty_settings_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.default_profile, "default");
        assert!(settings.helpers.is_empty());
    }

    #[test]
    fn test_load_settings_missing_file() {
        let result = load_settings("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
