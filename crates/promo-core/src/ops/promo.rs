use crate::{
    interface::{PromoCodeFile, PromoFileError},
    log,
    log::Topic,
};
use std::sync::Arc;
use tokio::task;

///
/// PromoFileOps
///
/// Promo-code artifact access. Every call runs on the blocking pool and
/// resolves back on the caller's task, which is where logging happens.
///

pub struct PromoFileOps;

impl PromoFileOps {
    /// Read and trim the artifact. `None` when absent or blank.
    pub async fn read(file: Arc<dyn PromoCodeFile>) -> Result<Option<String>, PromoFileError> {
        let location = file.location();

        let raw = task::spawn_blocking(move || {
            if !file.exists() {
                return Ok(None);
            }

            file.read_to_string().map(Some)
        })
        .await
        .map_err(|e| PromoFileError::Worker(e.to_string()))??;

        let Some(raw) = raw else {
            log!(Topic::PromoFile, Debug, "no promo code file at {location}");
            return Ok(None);
        };

        let code = normalize(&raw);
        if code.is_none() {
            log!(Topic::PromoFile, Warn, "promo code file {location} is empty");
        }

        Ok(code)
    }

    /// Remove the artifact; absent counts as removed.
    pub async fn delete(file: Arc<dyn PromoCodeFile>) -> Result<(), PromoFileError> {
        task::spawn_blocking(move || file.delete())
            .await
            .map_err(|e| PromoFileError::Worker(e.to_string()))?
    }
}

/// Trim surrounding whitespace; blank is no code at all.
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

///
/// TESTS
///
