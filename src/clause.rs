//! Parsing of the textual pieces of a command: literal values, value lists,
//! `WHERE` conditions and `SET` assignments.
//!
//! Literals are read without knowing the target column, so `"30"` is a
//! string and `30` an integer. Only `insert` checks them against the schema.

use crate::error::{DbError, Result};
use crate::filter::Predicate;
use crate::table::Assignments;
use crate::value::Value;

/// Converts one literal to a typed value.
///
/// - text wrapped in matching single or double quotes is a string, quotes removed
/// - `true` / `false` in any case are booleans
/// - anything parsing as an `i64` is an integer
/// - everything else is kept as a string
///
/// # Example
/// ```
/// # use flatdb::{clause::convert_value, Value};
/// assert_eq!(convert_value(" 42 "), Value::Int(42));
/// assert_eq!(convert_value("'42'"), Value::Str("42".into()));
/// assert_eq!(convert_value("TRUE"), Value::Bool(true));
/// assert_eq!(convert_value("\"a,b\""), Value::Str("a,b".into()));
/// ```
pub fn convert_value(text: &str) -> Value {
    let text = text.trim();

    if let Some(inner) = strip_quotes(text) {
        return Value::Str(inner.to_string());
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }

    Value::Str(text.to_string())
}

fn strip_quotes(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        text.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

/// Splits on commas that are outside single or double quotes.
///
/// Segments are trimmed. A quote only closes on the same character that
/// opened it; an unterminated quote swallows the rest of the text. A trailing
/// empty segment is dropped, inner empty segments are kept.
///
/// # Example
/// ```
/// # use flatdb::clause::split_top_level;
/// assert_eq!(split_top_level(r#""a,b", 3"#), vec![r#""a,b""#, "3"]);
/// ```
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (position, ch) in text.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, ',') => {
                segments.push(text[start..position].trim());
                start = position + 1;
            }
            _ => {}
        }
    }

    let last = text[start..].trim();
    if !last.is_empty() {
        segments.push(last);
    }

    segments
}

/// Parses a `column = value` condition.
///
/// Splits on the first `=`, so the value may itself contain `=`. Returns
/// `None` for empty text, text without `=`, or a blank column.
pub fn parse_where(text: &str) -> Option<Predicate> {
    let (column, value) = text.split_once('=')?;
    let column = column.trim();
    if column.is_empty() {
        return None;
    }

    Some(Predicate::new().with(column, convert_value(value)))
}

/// Parses `column = value, column = value, ...`.
///
/// Segments without `=` or with a blank column are skipped. Returns `None`
/// when no assignment is left.
pub fn parse_set(text: &str) -> Option<Assignments> {
    let assignments: Assignments = split_top_level(text)
        .into_iter()
        .filter_map(|segment| segment.split_once('='))
        .map(|(column, value)| (column.trim(), value))
        .filter(|(column, _)| !column.is_empty())
        .map(|(column, value)| (column.to_string(), convert_value(value)))
        .collect();

    if assignments.is_empty() {
        return None;
    }
    Some(assignments)
}

/// Parses the value list of an `insert`: `(v1, v2, ...)`.
///
/// The surrounding parentheses are optional.
///
/// # Errors
/// Returns [DbError::MalformedValueList] for an unbalanced parenthesis, an
/// empty list or an empty value.
pub fn parse_value_list(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim();
    let malformed = || DbError::MalformedValueList(trimmed.to_string());

    let inner = match trimmed.strip_prefix('(') {
        Some(rest) => rest.strip_suffix(')').ok_or_else(malformed)?,
        None => trimmed,
    };

    let segments = split_top_level(inner);
    if segments.is_empty() || segments.iter().any(|segment| segment.is_empty()) {
        return Err(malformed());
    }

    Ok(segments.into_iter().map(convert_value).collect())
}

/// [parse_where] with the failure turned into [DbError::MalformedClause].
pub fn require_where(text: &str) -> Result<Predicate> {
    parse_where(text).ok_or_else(|| DbError::malformed_where(text.trim()))
}

/// [parse_set] with the failure turned into [DbError::MalformedClause].
pub fn require_set(text: &str) -> Result<Assignments> {
    parse_set(text).ok_or_else(|| DbError::malformed_set(text.trim()))
}
