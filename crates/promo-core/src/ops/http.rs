use crate::{
    error::{Classified, ErrorClass},
    interface::{FetchError, FetchRequest, FetchResponse, HttpFetcher, HttpMethod, LoadFlags},
    ops::metrics::HttpMetrics,
};
use serde_json::Value;
use thiserror::Error as ThisError;

/// Response bodies longer than this are cut in log lines.
const LOG_BODY_PREVIEW: usize = 256;

///
/// HttpOpsError
///

#[derive(Debug, ThisError)]
pub enum HttpOpsError {
    #[error("http error status: {status}, payload: {preview}")]
    HttpStatus { status: u16, preview: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl Classified for HttpOpsError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::HttpStatus { .. } => ErrorClass::Protocol,
            Self::Fetch(_) => ErrorClass::Transport,
        }
    }
}

///
/// HttpOps
/// Referral-server request helpers with mandatory metrics.
///

pub struct HttpOps;

impl HttpOps {
    // -------------------------------------------------------------------------
    // Request builders
    // -------------------------------------------------------------------------

    /// Anonymous GET.
    #[must_use]
    pub fn get(url: String, max_response_bytes: usize, label: &'static str) -> FetchRequest {
        FetchRequest {
            method: HttpMethod::Get,
            url,
            body: None,
            load_flags: LoadFlags::anonymous(),
            max_response_bytes,
            label,
        }
    }

    /// Anonymous PUT with a JSON body.
    #[must_use]
    pub fn put_json(
        url: String,
        body: &Value,
        max_response_bytes: usize,
        label: &'static str,
    ) -> FetchRequest {
        FetchRequest {
            method: HttpMethod::Put,
            url,
            body: Some(body.to_string()),
            load_flags: LoadFlags::anonymous(),
            max_response_bytes,
            label,
        }
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Perform the request and require HTTP 200.
    pub async fn fetch_ok(
        fetcher: &dyn HttpFetcher,
        request: FetchRequest,
    ) -> Result<FetchResponse, HttpOpsError> {
        let method = request.method;
        let label = request.label;

        HttpMetrics::record_request(method, label);

        let res = fetcher.fetch(request).await.and_then_status();
        if res.is_err() {
            HttpMetrics::record_failure(method, label);
        }

        res
    }
}

///
/// helpers
///

trait StatusCheck {
    fn and_then_status(self) -> Result<FetchResponse, HttpOpsError>;
}

impl StatusCheck for Result<FetchResponse, FetchError> {
    fn and_then_status(self) -> Result<FetchResponse, HttpOpsError> {
        let response = self?;

        if response.status != 200 {
            return Err(HttpOpsError::HttpStatus {
                status: response.status,
                preview: preview(&response.body),
            });
        }

        Ok(response)
    }
}

fn preview(body: &str) -> String {
    if body.len() <= LOG_BODY_PREVIEW {
        return body.to_string();
    }

    let mut end = LOG_BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}…", &body[..end])
}

///
/// TESTS
///
