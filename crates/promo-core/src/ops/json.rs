use crate::error::{Classified, ErrorClass};
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

///
/// JsonError
/// Keeps "not present", "wrong type" and "not JSON at all" apart.
///

#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
pub enum JsonError {
    #[error("failed to parse json: {0}")]
    Parse(String),

    #[error("expected a json {expected} at the top level")]
    UnexpectedRoot { expected: &'static str },

    #[error("missing field '{0}'")]
    Missing(&'static str),

    #[error("field '{field}' is not a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{0}' is empty")]
    Empty(&'static str),
}

impl Classified for JsonError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Payload
    }
}

///
/// JsonObject
///

#[derive(Clone, Debug, PartialEq)]
pub struct JsonObject(Map<String, Value>);

impl JsonObject {
    /// A present, non-empty string.
    pub fn required_str(&self, field: &'static str) -> Result<&str, JsonError> {
        let value = self
            .optional_str(field)?
            .ok_or(JsonError::Missing(field))?;

        if value.is_empty() {
            return Err(JsonError::Empty(field));
        }

        Ok(value)
    }

    pub fn optional_str(&self, field: &'static str) -> Result<Option<&str>, JsonError> {
        match self.0.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(JsonError::WrongType {
                field,
                expected: "string",
            }),
        }
    }

    pub fn optional_bool(&self, field: &'static str) -> Result<Option<bool>, JsonError> {
        match self.0.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(JsonError::WrongType {
                field,
                expected: "bool",
            }),
        }
    }

    pub fn optional_array(&self, field: &'static str) -> Result<Option<&Vec<Value>>, JsonError> {
        match self.0.get(field) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(JsonError::WrongType {
                field,
                expected: "array",
            }),
        }
    }
}

///
/// JsonOps
///

pub struct JsonOps;

impl JsonOps {
    pub fn parse_object(body: &str) -> Result<JsonObject, JsonError> {
        match Self::parse(body)? {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(JsonError::UnexpectedRoot { expected: "object" }),
        }
    }

    pub fn parse_array(body: &str) -> Result<Vec<Value>, JsonError> {
        match Self::parse(body)? {
            Value::Array(items) => Ok(items),
            _ => Err(JsonError::UnexpectedRoot { expected: "array" }),
        }
    }

    fn parse(body: &str) -> Result<Value, JsonError> {
        serde_json::from_str(body).map_err(|e| JsonError::Parse(e.to_string()))
    }
}

///
/// TESTS
///
