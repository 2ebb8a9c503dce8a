use crate::error::{Classified, ErrorClass};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store io error at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("store document is corrupt: {0}")]
    Corrupt(String),

    #[error("store serialization failed: {0}")]
    Serialize(String),
}

impl Classified for StoreError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Storage
    }
}

///
/// PrefValue
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    String(String),
    /// Seconds since the Unix epoch.
    Time(u64),
    Int(i64),
    List(Vec<Value>),
}

///
/// PrefWrite
/// One step of a batched mutation.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PrefWrite<'a> {
    Set(&'a str, PrefValue),
    Clear(&'a str),
}

impl PrefWrite<'_> {
    #[must_use]
    pub const fn key(&self) -> &str {
        match self {
            Self::Set(key, _) | Self::Clear(key) => *key,
        }
    }
}

///
/// PrefStore
///
/// Named-key preference store that survives restarts. Typed getters fall
/// back to the registered default (empty / zero / absent) when a key is
/// missing or holds a different type.
///

pub trait PrefStore {
    fn get(&self, key: &str) -> Option<PrefValue>;

    /// Apply every write or none of them.
    fn write_all(&self, writes: Vec<PrefWrite<'_>>) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        self.write_all(vec![PrefWrite::Set(key, value)])
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.write_all(vec![PrefWrite::Clear(key)])
    }

    fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            Some(PrefValue::String(value)) => value,
            _ => String::new(),
        }
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set(key, PrefValue::String(value.to_string()))
    }

    fn get_time(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(PrefValue::Time(secs)) => Some(secs),
            _ => None,
        }
    }

    fn set_time(&self, key: &str, secs: u64) -> Result<(), StoreError> {
        self.set(key, PrefValue::Time(secs))
    }

    fn get_int(&self, key: &str) -> i64 {
        match self.get(key) {
            Some(PrefValue::Int(value)) => value,
            _ => 0,
        }
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.set(key, PrefValue::Int(value))
    }

    fn get_list(&self, key: &str) -> Vec<Value> {
        match self.get(key) {
            Some(PrefValue::List(values)) => values,
            _ => Vec::new(),
        }
    }

    fn set_list(&self, key: &str, values: Vec<Value>) -> Result<(), StoreError> {
        self.set(key, PrefValue::List(values))
    }
}
