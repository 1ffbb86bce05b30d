//! Value Codec Module
//!
//! Converts caller values to the text stored in the key-value store and back.
//!
//! Wire rules:
//! - mappings and sequences are stored as JSON text
//! - strings are stored verbatim, numbers as their decimal text
//! - on read, text that parses as a JSON object or array is decoded,
//!   anything else comes back unchanged as [`Decoded::Raw`]

mod dates;
mod record;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use dates::{date_format, datetime_format, WireDate, WireDateTime, DATETIME_FORMAT, DATE_FORMAT};
pub use record::Record;

// == Encode ==
/// Renders any serializable value to its wire text.
///
/// Fails only when the value cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(encode_value(&value))
}

/// Renders an already built JSON value to its wire text.
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// == Decode ==
/// Decodes wire text. Never fails: non-JSON text and JSON scalars are
/// returned as [`Decoded::Raw`] holding the input unchanged.
pub fn decode(raw: &str) -> Decoded {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Decoded::from_value(value),
        _ => Decoded::Raw(raw.to_string()),
    }
}

// == Decoded ==
/// A value read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Wire text that was not a JSON container, unchanged
    Raw(String),
    /// Scalar element of a decoded sequence
    Scalar(Value),
    /// Decoded JSON object
    Record(Record),
    /// Decoded JSON array, elements decoded recursively
    List(Vec<Decoded>),
}

impl Decoded {
    /// Builds the decoded form of an already parsed JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Decoded::Record(Record::new(map)),
            Value::Array(items) => {
                Decoded::List(items.into_iter().map(Decoded::from_value).collect())
            }
            scalar => Decoded::Scalar(scalar),
        }
    }

    /// The empty raw value returned for absent keys.
    pub fn empty() -> Self {
        Decoded::Raw(String::new())
    }

    /// True for an empty raw value or an empty container.
    pub fn is_empty(&self) -> bool {
        match self {
            Decoded::Raw(raw) => raw.is_empty(),
            Decoded::Scalar(value) => value.is_null(),
            Decoded::Record(record) => record.is_empty(),
            Decoded::List(items) => items.is_empty(),
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Decoded::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Decoded::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Decoded]> {
        match self {
            Decoded::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts back to a plain JSON value. Raw text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Raw(raw) => Value::String(raw),
            Decoded::Scalar(value) => value,
            Decoded::Record(record) => Value::Object(record.into_inner()),
            Decoded::List(items) => {
                Value::Array(items.into_iter().map(Decoded::into_value).collect())
            }
        }
    }

    /// Deserializes into a caller type.
    ///
    /// Raw text is first tried as JSON (so `"42"` reads as a number) and
    /// otherwise treated as a JSON string.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Decoded::Raw(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(_) => Ok(serde_json::from_value(Value::String(raw))?),
            },
            other => Ok(serde_json::from_value(other.into_value())?),
        }
    }
}

impl Default for Decoded {
    fn default() -> Self {
        Decoded::empty()
    }
}

impl Serialize for Decoded {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Decoded::Raw(raw) => serializer.serialize_str(raw),
            Decoded::Scalar(value) => value.serialize(serializer),
            Decoded::Record(record) => record.serialize(serializer),
            Decoded::List(items) => items.serialize(serializer),
        }
    }
}
