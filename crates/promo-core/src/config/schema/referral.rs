use super::{ConfigSchemaError, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

///
/// Defaults
///

mod defaults {
    use std::path::PathBuf;

    pub fn server() -> String {
        "promo.example.com".to_string()
    }

    pub fn scheme() -> String {
        "https".to_string()
    }

    pub fn server_env() -> String {
        "REFERRAL_SERVER".to_string()
    }

    pub fn api_key_env() -> String {
        "REFERRAL_API_KEY".to_string()
    }

    pub const fn activity_check_interval_secs() -> u64 {
        60 * 60
    }

    pub const fn request_timeout_secs() -> u64 {
        30
    }

    pub const fn max_response_bytes() -> usize {
        1024 * 1024
    }

    pub fn user_data_dir() -> PathBuf {
        PathBuf::from("data")
    }

    pub fn promo_code_file() -> String {
        "promoCode".to_string()
    }

    pub fn prefs_file() -> String {
        "referral_prefs.json".to_string()
    }
}

/// Upper bound for the response cap; anything bigger is a misconfiguration.
pub const MAX_RESPONSE_BYTES_LIMIT: usize = 16 * 1024 * 1024;

///
/// ReferralConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReferralConfig {
    /// Referral server host, optionally with a port.
    #[serde(default = "defaults::server")]
    pub server: String,

    #[serde(default = "defaults::scheme")]
    pub scheme: String,

    /// Environment variable that overrides `server` when set and non-empty.
    #[serde(default = "defaults::server_env")]
    pub server_env: String,

    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// Poll period for the built-in activity scheduler; 0 disables it.
    #[serde(default = "defaults::activity_check_interval_secs")]
    pub activity_check_interval_secs: u64,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "defaults::max_response_bytes")]
    pub max_response_bytes: usize,

    #[serde(default = "defaults::user_data_dir")]
    pub user_data_dir: PathBuf,

    #[serde(default = "defaults::promo_code_file")]
    pub promo_code_file: String,

    #[serde(default = "defaults::prefs_file")]
    pub prefs_file: String,
}

impl ReferralConfig {
    #[must_use]
    pub fn promo_code_path(&self) -> PathBuf {
        self.user_data_dir.join(&self.promo_code_file)
    }

    #[must_use]
    pub fn prefs_path(&self) -> PathBuf {
        self.user_data_dir.join(&self.prefs_file)
    }
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            server: defaults::server(),
            scheme: defaults::scheme(),
            server_env: defaults::server_env(),
            api_key_env: defaults::api_key_env(),
            activity_check_interval_secs: defaults::activity_check_interval_secs(),
            request_timeout_secs: defaults::request_timeout_secs(),
            max_response_bytes: defaults::max_response_bytes(),
            user_data_dir: defaults::user_data_dir(),
            promo_code_file: defaults::promo_code_file(),
            prefs_file: defaults::prefs_file(),
        }
    }
}

impl Validate for ReferralConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.server.trim().is_empty() {
            return Err(ConfigSchemaError::ValidationError(
                "referral.server must not be empty".into(),
            ));
        }

        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(ConfigSchemaError::ValidationError(format!(
                "referral.scheme '{}' must be http or https",
                self.scheme
            )));
        }

        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigSchemaError::ValidationError(format!(
                "referral.max_response_bytes {} must be in 1..={MAX_RESPONSE_BYTES_LIMIT}",
                self.max_response_bytes
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigSchemaError::ValidationError(
                "referral.request_timeout_secs must be positive".into(),
            ));
        }

        for (field, name) in [
            ("promo_code_file", &self.promo_code_file),
            ("prefs_file", &self.prefs_file),
        ] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigSchemaError::ValidationError(format!(
                    "referral.{field} '{name}' must be a bare file name"
                )));
            }
        }

        Ok(())
    }
}
