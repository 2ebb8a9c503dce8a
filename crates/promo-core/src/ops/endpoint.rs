use crate::{config::schema::ReferralConfig, interface::EnvReader};
use derive_more::Display;
use serde_json::{Value, json};

pub const HEADERS_PATH: &str = "/promo/custom-headers";
pub const INIT_PATH: &str = "/promo/initialize/nonoo";
pub const ACTIVITY_PATH: &str = "/promo/activity";

///
/// Platform
/// Identifier reported to the referral server at initialization.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Platform {
    #[display("winia32")]
    WinIa32,

    #[display("winx64")]
    WinX64,

    #[display("osx")]
    Osx,

    #[display("linux")]
    Linux,

    #[display("")]
    Unknown,
}

impl Platform {
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            if cfg!(target_arch = "x86") {
                Self::WinIa32
            } else {
                Self::WinX64
            }
        } else if cfg!(target_os = "macos") {
            Self::Osx
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Unknown
        }
    }
}

///
/// EndpointOps
/// URLs and request bodies for the referral server.
///

pub struct EndpointOps;

impl EndpointOps {
    /// `{scheme}://{host}{path}`; the environment override wins when non-empty.
    #[must_use]
    pub fn url(cfg: &ReferralConfig, env: &dyn EnvReader, path: &str) -> String {
        let host = env
            .var(&cfg.server_env)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| cfg.server.clone());

        format!("{}://{}{path}", cfg.scheme, host.trim())
    }

    /// Empty when unset; the server decides what to do with it.
    #[must_use]
    pub fn api_key(cfg: &ReferralConfig, env: &dyn EnvReader) -> String {
        env.var(&cfg.api_key_env).unwrap_or_default()
    }

    #[must_use]
    pub fn init_payload(api_key: &str, promo_code: &str, platform: Platform) -> Value {
        json!({
            "api_key": api_key,
            "referral_code": promo_code,
            "platform": platform.to_string(),
        })
    }

    #[must_use]
    pub fn activity_payload(api_key: &str, download_id: &str) -> Value {
        json!({
            "api_key": api_key,
            "download_id": download_id,
        })
    }
}

///
/// TESTS
///
