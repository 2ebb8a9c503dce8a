use crate::error::{Classified, ErrorClass};
use thiserror::Error as ThisError;

///
/// PromoFileError
///

#[derive(Debug, ThisError)]
pub enum PromoFileError {
    #[error("failed to read promo code from {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to delete promo code file {path}: {reason}")]
    Delete { path: String, reason: String },

    #[error("background file worker failed: {0}")]
    Worker(String),
}

impl Classified for PromoFileError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Filesystem
    }
}

///
/// PromoCodeFile
///
/// The single installer-dropped artifact. Implementations are called from a
/// blocking worker thread, hence `Send + Sync`.
///

pub trait PromoCodeFile: Send + Sync {
    /// Human-readable location, used in log lines.
    fn location(&self) -> String;

    fn exists(&self) -> bool;

    fn read_to_string(&self) -> Result<String, PromoFileError>;

    /// Remove the artifact. Removing an absent artifact succeeds.
    fn delete(&self) -> Result<(), PromoFileError>;
}
