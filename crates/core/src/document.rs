//! Corpus records and their payloads.
//!
//! A [`Record`] is one line of the newline-delimited JSON corpus. Its full
//! JSON object becomes the point [`Payload`]; its `description` field is the
//! text that gets embedded.

use crate::config;
use crate::error::{Error, Result};
use serde_json::Value;

/// Arbitrary JSON metadata stored with each point and returned by search.
pub type Payload = serde_json::Map<String, Value>;

/// A corpus record: the text to embed and the metadata to store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Text embedded into the dense and sparse vectors.
    pub description: String,
    /// The complete original object, `description` included.
    pub payload: Payload,
}

impl Record {
    /// Builds a record from a parsed JSON object.
    ///
    /// Fails if the object has no string `description` field.
    pub fn from_payload(payload: Payload) -> Result<Self> {
        let description = match payload.get(config::DESCRIPTION_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(Error::LoadData(format!(
                    "'{}' must be a string, got {}",
                    config::DESCRIPTION_FIELD,
                    json_type_name(other)
                )))
            }
            None => {
                return Err(Error::LoadData(format!(
                    "missing '{}' field",
                    config::DESCRIPTION_FIELD
                )))
            }
        };
        Ok(Self {
            description,
            payload,
        })
    }

    /// Parses one corpus line. `line_no` is 1-based and only used in errors.
    pub fn from_json_line(line: &str, line_no: usize) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::LoadData(format!("line {}: invalid JSON: {}", line_no, e)))?;
        let Value::Object(payload) = value else {
            return Err(Error::LoadData(format!(
                "line {}: expected a JSON object, got {}",
                line_no,
                json_type_name(&value)
            )));
        };
        Self::from_payload(payload).map_err(|e| match e {
            Error::LoadData(msg) => Error::LoadData(format!("line {}: {}", line_no, msg)),
            other => other,
        })
    }
}

/// Parses a whole newline-delimited corpus. The first bad line aborts.
pub fn parse_corpus(contents: &str) -> Result<Vec<Record>> {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| Record::from_json_line(line, i + 1))
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
