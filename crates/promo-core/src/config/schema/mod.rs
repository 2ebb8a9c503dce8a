mod log;
mod referral;

pub use log::*;
pub use referral::*;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigSchemaError
///

#[derive(Debug, ThisError)]
pub enum ConfigSchemaError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

///
/// Validate
///

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigSchemaError>;
}

///
/// ConfigModel
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigModel {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub referral: ReferralConfig,
}

impl Validate for ConfigModel {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.log.validate()?;
        self.referral.validate()?;

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ConfigModel::default()
            .validate()
            .expect("default config must validate");
    }

    #[test]
    fn bad_scheme_is_rejected() {
        let mut cfg = ConfigModel::default();
        cfg.referral.scheme = "ftp".into();

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn file_names_must_not_contain_separators() {
        let mut cfg = ConfigModel::default();
        cfg.referral.promo_code_file = "../promoCode".into();

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_response_cap_is_rejected() {
        let mut cfg = ConfigModel::default();
        cfg.referral.max_response_bytes = MAX_RESPONSE_BYTES_LIMIT + 1;

        assert!(cfg.validate().is_err());
    }
}
