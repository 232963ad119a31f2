//! Error type shared by every layer of the store.

use std::fmt;

use thiserror::Error;

use crate::data_type::DataType;

pub type Result<T> = std::result::Result<T, DbError>;

/// The clause a [DbError::MalformedClause] was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Where,
    Set,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Where => f.write_str("WHERE"),
            Self::Set => f.write_str("SET"),
        }
    }
}

/// Every failure a command can end with.
///
/// Core operations never panic on user input: they return one of these and the
/// interpreter reports it before reading the next line.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("invalid table name {0:?}, use letters, digits and underscores")]
    InvalidName(String),

    #[error("table {0:?} already exists")]
    AlreadyExists(String),

    #[error("table {0:?} does not exist")]
    NotFound(String),

    #[error("malformed column definition {0:?}, use name:type")]
    MalformedColumn(String),

    #[error("column name cannot be empty")]
    EmptyColumnName,

    #[error("unsupported type {0:?}, use int, str or bool")]
    UnsupportedType(String),

    #[error("column \"ID\" is reserved")]
    ReservedColumn,

    #[error("invalid column name {0:?}")]
    InvalidColumnName(String),

    #[error("column {0:?} is declared more than once")]
    DuplicateColumn(String),

    #[error("expected {expected} values, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("no IDs left to assign")]
    IdExhausted,

    #[error("expected a value of type {expected}, got {found}")]
    TypeMismatch { expected: DataType, found: DataType },

    #[error("malformed {kind} clause {text:?}, use column = value")]
    MalformedClause { kind: ClauseKind, text: String },

    #[error("malformed value list {0:?}, use (value, value, ...)")]
    MalformedValueList(String),

    #[error("unknown command {0:?}, type help for the list of commands")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    pub fn malformed_where(text: impl Into<String>) -> Self {
        Self::MalformedClause {
            kind: ClauseKind::Where,
            text: text.into(),
        }
    }

    pub fn malformed_set(text: impl Into<String>) -> Self {
        Self::MalformedClause {
            kind: ClauseKind::Set,
            text: text.into(),
        }
    }
}
