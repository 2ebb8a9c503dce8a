pub mod schema;

use crate::error::{Classified, ErrorClass};
use schema::{ConfigSchemaError, Validate};
use std::{fs, path::Path, sync::Arc};
use thiserror::Error as ThisError;

pub use schema::ConfigModel;

/// Errors related to configuration loading and parsing.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {reason}")]
    CannotRead { path: String, reason: String },

    /// TOML could not be parsed into the expected structure.
    #[error("toml error: {0}")]
    CannotParseToml(String),

    /// Wrapper for data schema-level errors.
    #[error(transparent)]
    ConfigSchema(#[from] ConfigSchemaError),
}

impl Classified for ConfigError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Config
    }
}

///
/// Config
///
/// Parses and validates configuration. The result is handed to the manager
/// explicitly; there is no process-wide config slot.
///

pub struct Config;

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(config_str: &str) -> Result<Arc<ConfigModel>, ConfigError> {
        let config: ConfigModel =
            toml::from_str(config_str).map_err(|e| ConfigError::CannotParseToml(e.to_string()))?;

        // validate
        config.validate()?;

        Ok(Arc::new(config))
    }

    /// Load from a file, or fall back to validated defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Arc<ConfigModel>, ConfigError> {
        let Some(path) = path else {
            let config = ConfigModel::default();
            config.validate()?;

            return Ok(Arc::new(config));
        };

        let raw = fs::read_to_string(path).map_err(|e| ConfigError::CannotRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_toml(&raw)
    }

    /// Render a config back to TOML.
    pub fn to_toml(config: &ConfigModel) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::CannotParseToml(e.to_string()))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Level;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = Config::from_toml("").expect("empty toml parses");

        assert_eq!(cfg.referral.scheme, "https");
        assert_eq!(cfg.referral.max_response_bytes, 1024 * 1024);
        assert_eq!(cfg.referral.promo_code_file, "promoCode");
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_toml(
            r#"
            [log]
            min_level = "Warn"

            [referral]
            server = "referrals.internal:8443"
            activity_check_interval_secs = 0
            "#,
        )
        .expect("config parses");

        assert_eq!(cfg.log.min_level, Level::Warn);
        assert_eq!(cfg.referral.server, "referrals.internal:8443");
        assert_eq!(cfg.referral.activity_check_interval_secs, 0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml("[referral]\nbogus = 1\n").unwrap_err();

        assert!(matches!(err, ConfigError::CannotParseToml(_)));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config::load(None).expect("defaults");
        let rendered = Config::to_toml(&cfg).expect("renders");
        let reparsed = Config::from_toml(&rendered).expect("reparses");

        assert_eq!(reparsed.referral.server, cfg.referral.server);
    }
}
