use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Represents the supported data types in a table schema.
/// These types define the structure of columns and the expected format of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A 64-bit signed integer. Booleans are never accepted here.
    Int,
    /// A UTF-8 character string.
    Str,
    /// A boolean value (true or false).
    Bool,
}

impl DataType {
    /// The tag used in column definitions and in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags are matched case-insensitively after trimming, so `" INT "` is `int`.
impl FromStr for DataType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        match tag.as_str() {
            "int" => Ok(Self::Int),
            "str" => Ok(Self::Str),
            "bool" => Ok(Self::Bool),
            _ => Err(DbError::UnsupportedType(tag)),
        }
    }
}
