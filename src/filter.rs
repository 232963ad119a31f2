use bitvec::prelude::*;
use indexmap::IndexMap;

use crate::record::Record;
use crate::value::Value;

/// A conjunction of `column = value` conditions.
///
/// A record matches when every condition holds. Values compare by type and
/// value, so `Int(1)` never matches `Bool(true)` or `Str("1")`. A predicate
/// with no condition matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: IndexMap<String, Value>,
}

impl Predicate {
    /// Creates a predicate that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [Predicate::insert].
    ///
    /// # Example
    /// ```
    /// # use flatdb::{Predicate, Value};
    /// let predicate = Predicate::new().with("name", "Bob").with("age", Value::Int(25));
    /// assert_eq!(predicate.len(), 2);
    /// ```
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Adds a condition; a second condition on the same column replaces the first.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.conditions.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.conditions.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(column, value)| (column.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates the predicate against one record.
    ///
    /// A condition on a column the record does not have is false.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| record.get(column) == Some(expected))
    }

    /// Evaluates the predicate against every record; bit `i` is set when
    /// `records[i]` matches.
    pub fn mask(&self, records: &[Record]) -> BitVec {
        records.iter().map(|record| self.matches(record)).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, age: i64) -> Record {
        [
            ("ID", Value::Int(id)),
            ("name", Value::from(name)),
            ("age", Value::Int(age)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_empty_predicate_matches_all() {
        let predicate = Predicate::new();

        assert!(predicate.is_empty());
        assert!(predicate.matches(&record(1, "Alice", 30)));
        assert!(predicate.matches(&Record::default()));
    }

    #[test]
    fn test_single_condition() {
        let predicate = Predicate::new().with("name", "Bob");

        assert!(predicate.matches(&record(2, "Bob", 25)));
        assert!(!predicate.matches(&record(1, "Alice", 30)));
    }

    #[test]
    fn test_conjunction() {
        let predicate = Predicate::new().with("name", "Bob").with("age", Value::Int(25));

        assert!(predicate.matches(&record(2, "Bob", 25)));
        assert!(!predicate.matches(&record(3, "Bob", 40)));
    }

    #[test]
    fn test_strict_type_equality() {
        let row: Record = [("ID", Value::Int(1)), ("flag", Value::Int(1))]
            .into_iter()
            .collect();

        assert!(!Predicate::new().with("flag", true).matches(&row));
        assert!(!Predicate::new().with("flag", "1").matches(&row));
        assert!(Predicate::new().with("flag", Value::Int(1)).matches(&row));
    }

    #[test]
    fn test_missing_column_never_matches() {
        let predicate = Predicate::new().with("email", "a@b.c");
        assert!(!predicate.matches(&record(1, "Alice", 30)));
    }

    #[test]
    fn test_mask() {
        let rows = vec![
            record(1, "Alice", 30),
            record(2, "Bob", 25),
            record(3, "Carol", 25),
        ];

        let mask = Predicate::new().with("age", Value::Int(25)).mask(&rows);

        assert_eq!(mask.len(), 3);
        assert!(!mask[0]);
        assert!(mask[1]);
        assert!(mask[2]);
        assert_eq!(mask.count_ones(), 2);
    }
}
