//! The `page` cursor of a page envelope
//!
//! The Satellite API reports the current page as an integer when no `page`
//! query parameter was sent and as a string when one was, so the field is
//! decoded into a closed union over the wire shapes and normalized here.

use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonValue};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Wire representation of the current page number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum PageCursor {
    /// Signed integer (`"page": 2`)
    Integer(i64),
    /// Integer too large for `i64`
    Unsigned(u64),
    /// Floating point (`"page": 2.0`)
    Float(f64),
    /// String (`"page": "2"`)
    Text(String),
    /// Any other shape, kept so the error can describe it
    Unsupported(JsonValue),
}

impl Default for PageCursor {
    /// A missing `page` field decodes the same as `null`
    fn default() -> Self {
        Self::Unsupported(JsonValue::Null)
    }
}

impl PageCursor {
    /// Classify a raw JSON value
    pub fn from_value(value: &JsonValue) -> Self {
        Self::from(value.clone())
    }

    /// Convert the cursor into a page number.
    ///
    /// Floats are truncated toward zero. A string that is not a base-10
    /// integer normalizes to `0`. Only shapes outside the union fail.
    pub fn normalize(&self) -> Result<i64> {
        match self {
            Self::Integer(v) => Ok(*v),
            Self::Unsigned(v) => Ok(i64::try_from(*v).unwrap_or(i64::MAX)),
            Self::Float(v) => Ok(*v as i64),
            Self::Text(s) => Ok(s.parse::<i64>().unwrap_or_else(|_| {
                warn!(cursor = %s, "non-numeric page cursor, treating as page 0");
                0
            })),
            Self::Unsupported(v) => Err(Error::unsupported_cursor(json_type_name(v))),
        }
    }
}

impl From<JsonValue> for PageCursor {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Unsigned(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            JsonValue::String(s) => Self::Text(s),
            other => Self::Unsupported(other),
        }
    }
}

impl From<PageCursor> for JsonValue {
    fn from(cursor: PageCursor) -> Self {
        match cursor {
            PageCursor::Integer(v) => JsonValue::from(v),
            PageCursor::Unsigned(v) => JsonValue::from(v),
            PageCursor::Float(v) => JsonValue::from(v),
            PageCursor::Text(s) => JsonValue::String(s),
            PageCursor::Unsupported(v) => v,
        }
    }
}

impl From<i64> for PageCursor {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for PageCursor {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
