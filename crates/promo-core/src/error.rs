use derive_more::Display;
use thiserror::Error as ThisError;

///
/// Error
///
/// Crate-level structured error.
///
/// Every layer keeps its own `thiserror` enum; workflows lift those into this
/// envelope with `.at(origin)` so log lines carry both what went wrong (class)
/// and which lifecycle operation it broke (origin).
///
/// Nothing in the referral lifecycle escalates these past a log line.
///

#[derive(Debug, ThisError)]
#[error("{class}/{origin}: {message}")]
pub struct Error {
    class: ErrorClass,
    origin: ErrorOrigin,
    message: String,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.class
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        self.origin
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    Config,
    Filesystem,
    Launcher,
    Lifecycle,
    Payload,
    Protocol,
    Storage,
    Transport,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorOrigin {
    Activity,
    Config,
    Headers,
    Init,
    Manager,
    PromoFile,
    Store,
}

///
/// Classified
/// Implemented by every layer error so it can be lifted into `Error`.
///

pub trait Classified: std::fmt::Display {
    fn class(&self) -> ErrorClass;
}

///
/// ErrorContext
///

pub trait ErrorContext<T> {
    /// Lift a layer error into the crate error, tagging the failing operation.
    fn at(self, origin: ErrorOrigin) -> Result<T, Error>;
}

impl<T, E: Classified> ErrorContext<T> for Result<T, E> {
    fn at(self, origin: ErrorOrigin) -> Result<T, Error> {
        self.map_err(|err| Error::new(err.class(), origin, err.to_string()))
    }
}

///
/// TESTS
///
