use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::error::{DbError, Result};

/// Represents a single cell value stored in a table.
///
/// Every value carries its type in the variant, so an integer and a boolean
/// can never be confused: `Int(1)` and `Bool(true)` are different values.
///
/// In the JSON documents a value is the bare scalar (`30`, `"Alice"`, `true`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int(i64),
    /// A UTF-8 string value.
    Str(String),
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// Returns the inner integer value if this is a [Value::Int].
    /// Otherwise, returns `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::Str].
    /// Otherwise, returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean value if this is a [Value::Bool].
    /// Otherwise, returns `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the [DataType] corresponding to this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Str(_) => DataType::Str,
            Self::Bool(_) => DataType::Bool,
        }
    }
}

/// Checks that `value` can be stored in a column declared as `expected`.
///
/// There is no coercion between the three types.
///
/// # Example
/// ```
/// # use flatdb::{DataType, Value, validate_value};
/// assert!(validate_value(&Value::Int(30), DataType::Int).is_ok());
/// assert!(validate_value(&Value::Bool(true), DataType::Int).is_err());
/// ```
pub fn validate_value(value: &Value, expected: DataType) -> Result<()> {
    let found = value.data_type();
    if found != expected {
        return Err(DbError::TypeMismatch { expected, found });
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
