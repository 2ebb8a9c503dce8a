use crate::error::{Classified, ErrorClass};
use async_trait::async_trait;
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// HttpMethod
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum HttpMethod {
    #[display("GET")]
    Get,

    #[display("PUT")]
    Put,
}

///
/// LoadFlags
/// What ambient browser-style state a request may touch. Every request the
/// manager builds is `anonymous()`; the production fetcher holds no cookie
/// jar or credentials at all, so only `use_cache` changes what it sends.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoadFlags {
    pub send_cookies: bool,
    pub save_cookies: bool,
    pub use_cache: bool,
    pub send_auth: bool,
}

impl LoadFlags {
    /// No cookies in or out, no cache, no ambient credentials.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            send_cookies: false,
            save_cookies: false,
            use_cache: false,
            send_auth: false,
        }
    }
}

///
/// FetchRequest
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchRequest {
    pub method: HttpMethod,
    pub url: String,
    /// JSON document sent as `application/json`.
    pub body: Option<String>,
    pub load_flags: LoadFlags,
    pub max_response_bytes: usize,
    /// Metrics label.
    pub label: &'static str,
}

///
/// FetchResponse
/// Any HTTP status is a response, not an error.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

///
/// FetchError
/// Transport-level failures only.
///

#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("response body error: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl Classified for FetchError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Transport
    }
}

///
/// HttpFetcher
///

#[async_trait(?Send)]
pub trait HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}
