use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::ID_COLUMN;
use crate::value::Value;

/// One row of a table, keyed by column name.
///
/// A record always holds `ID` plus one entry per user column of its table,
/// in schema order. It is persisted as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Starts a record with the given `ID`.
    pub fn with_id(id: i64) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(ID_COLUMN.to_string(), Value::Int(id));
        Self { fields }
    }

    /// The record's `ID`, if it holds an integer one.
    pub fn id(&self) -> Option<i64> {
        self.get(ID_COLUMN).and_then(Value::as_int)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Iterates over `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(column, value)| (column.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends or replaces a field. Replacing keeps the column's position.
    pub(crate) fn set(&mut self, column: impl Into<String>, value: Value) {
        self.fields.insert(column.into(), value);
    }

    /// Replaces an existing field, returning `false` if the column is absent.
    pub(crate) fn replace(&mut self, column: &str, value: Value) -> bool {
        match self.fields.get_mut(column) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_id_and_set() {
        let mut record = Record::with_id(7);
        record.set("name", Value::from("Alice"));

        assert_eq!(record.id(), Some(7));
        assert_eq!(record.get("name"), Some(&Value::Str("Alice".into())));
        assert_eq!(record.len(), 2);
        assert!(!record.contains("age"));
    }

    #[test]
    fn test_replace_only_existing() {
        let mut record = Record::with_id(1);
        record.set("age", Value::Int(30));

        assert!(record.replace("age", Value::Int(31)));
        assert!(!record.replace("height", Value::Int(180)));

        let columns: Vec<_> = record.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["ID", "age"]);
        assert_eq!(record.get("age"), Some(&Value::Int(31)));
    }

    #[test]
    fn test_json_object_keeps_order() {
        let record: Record = [
            ("ID", Value::Int(2)),
            ("name", Value::from("Bob")),
            ("active", Value::Bool(true)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"ID":2,"name":"Bob","active":true}"#);

        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_non_integer_id() {
        let record: Record = [("ID", Value::from("one"))].into_iter().collect();
        assert_eq!(record.id(), None);
    }
}
