use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::filter::Predicate;
use crate::record::Record;
use crate::schema::{ID_COLUMN, Schema};
use crate::value::{Value, validate_value};

/// Column assignments of an `update`, in the order they were written.
pub type Assignments = IndexMap<String, Value>;

/// The rows of one table, in insertion order.
///
/// Persisted as a JSON array of record objects, one document per table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSet {
    records: Vec<Record>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The ID the next insert receives: one past the highest existing ID.
    ///
    /// IDs of deleted rows are never handed out again unless they were the
    /// highest ones. Returns `None` once the highest ID is `i64::MAX`.
    pub fn next_id(&self) -> Option<i64> {
        match self.records.iter().filter_map(Record::id).max() {
            Some(highest) => highest.checked_add(1),
            None => Some(1),
        }
    }

    /// insert a new row built from positional values
    ///
    /// Values bind to the schema's user columns in declaration order. The row
    /// is appended only once every value has been checked.
    ///
    /// # Errors
    /// - [DbError::ArityMismatch] if the value count differs from the number
    ///   of user columns.
    /// - [DbError::TypeMismatch] for the first value (left to right) whose
    ///   type differs from its column's.
    /// - [DbError::IdExhausted] if the highest ID is already `i64::MAX`.
    ///
    /// # Example
    /// ```
    /// # use flatdb::{RowSet, SchemaStore, Value};
    /// let mut store = SchemaStore::new();
    /// let schema = store.create_table("users", &["name:str", "age:int"]).unwrap();
    ///
    /// let mut rows = RowSet::new();
    /// let id = rows.insert(schema, vec![Value::from("Alice"), Value::Int(30)]).unwrap();
    /// assert_eq!(id, 1);
    /// ```
    pub fn insert(&mut self, schema: &Schema, values: Vec<Value>) -> Result<i64> {
        let expected = schema.user_columns().count();
        if values.len() != expected {
            return Err(DbError::ArityMismatch {
                expected,
                found: values.len(),
            });
        }

        for ((_, data_type), value) in schema.user_columns().zip(&values) {
            validate_value(value, data_type)?;
        }

        let id = self.next_id().ok_or(DbError::IdExhausted)?;
        let mut record = Record::with_id(id);
        for ((column, _), value) in schema.user_columns().zip(values) {
            record.set(column, value);
        }
        self.records.push(record);

        Ok(id)
    }

    /// Returns the rows matching `predicate`, in order; every row when it is `None`.
    pub fn select(&self, predicate: Option<&Predicate>) -> Vec<&Record> {
        match predicate {
            None => self.records.iter().collect(),
            Some(predicate) => self
                .records
                .iter()
                .filter(|record| predicate.matches(record))
                .collect(),
        }
    }

    /// Overwrites columns of every row matching `predicate`.
    ///
    /// Assignments to `ID` and to columns the rows do not have are ignored.
    /// Assigned values are checked against the schema before any row changes.
    ///
    /// Returns the number of rows that matched.
    ///
    /// # Errors
    /// Returns [DbError::TypeMismatch] if a value does not fit its column; the
    /// row set is then left untouched.
    pub fn update(
        &mut self,
        schema: &Schema,
        assignments: &Assignments,
        predicate: &Predicate,
    ) -> Result<usize> {
        for (column, value) in assignments {
            if column == ID_COLUMN {
                continue;
            }
            if let Some(data_type) = schema.column_type(column) {
                validate_value(value, data_type)?;
            }
        }

        let mut updated = 0;
        for record in self.records.iter_mut().filter(|r| predicate.matches(r)) {
            for (column, value) in assignments {
                if column != ID_COLUMN {
                    record.replace(column, value.clone());
                }
            }
            updated += 1;
        }

        Ok(updated)
    }

    /// Removes every row matching `predicate`, keeping the others in order.
    ///
    /// Returns the number of rows removed.
    pub fn delete(&mut self, predicate: &Predicate) -> usize {
        let mask = predicate.mask(&self.records);
        let removed = mask.count_ones();
        if removed == 0 {
            return 0;
        }

        let mut index = 0;
        self.records.retain(|_| {
            let keep = !mask[index];
            index += 1;
            keep
        });

        removed
    }
}

impl From<Vec<Record>> for RowSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaStore;
    use proptest::prelude::*;

    fn users() -> Schema {
        let mut store = SchemaStore::new();
        store
            .create_table("users", &["name:str", "age:int"])
            .unwrap()
            .clone()
    }

    fn populated() -> (Schema, RowSet) {
        let schema = users();
        let mut rows = RowSet::new();
        rows.insert(&schema, vec!["Alice".into(), Value::Int(30)])
            .unwrap();
        rows.insert(&schema, vec!["Bob".into(), Value::Int(25)])
            .unwrap();
        rows.insert(&schema, vec!["Carol".into(), Value::Int(25)])
            .unwrap();
        (schema, rows)
    }

    fn ids(records: &[&Record]) -> Vec<i64> {
        records.iter().filter_map(|r| r.id()).collect()
    }

    #[test]
    fn test_insert_assigns_ids() {
        let (_, rows) = populated();

        assert_eq!(rows.len(), 3);
        assert_eq!(ids(&rows.select(None)), vec![1, 2, 3]);

        let first = &rows.records()[0];
        let columns: Vec<_> = first.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["ID", "name", "age"]);
        assert_eq!(first.get("name"), Some(&Value::Str("Alice".into())));
    }

    #[test]
    fn test_next_id_follows_highest_remaining() {
        let (schema, mut rows) = populated();

        rows.delete(&Predicate::new().with("ID", Value::Int(3)));
        rows.delete(&Predicate::new().with("ID", Value::Int(1)));
        let id = rows
            .insert(&schema, vec!["Dave".into(), Value::Int(40)])
            .unwrap();

        assert_eq!(id, 3);
        assert_eq!(ids(&rows.select(None)), vec![2, 3]);
    }

    #[test]
    fn test_next_id_after_gap() {
        let (schema, mut rows) = populated();
        rows.delete(&Predicate::new().with("ID", Value::Int(2)));

        let id = rows
            .insert(&schema, vec!["Eve".into(), Value::Int(22)])
            .unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn test_insert_after_max_id_fails() {
        let schema = users();
        let mut last = Record::with_id(i64::MAX);
        last.set("name", "Max".into());
        last.set("age", Value::Int(1));
        let mut rows = RowSet::from(vec![last]);
        let before = rows.clone();

        assert_eq!(rows.next_id(), None);
        let err = rows
            .insert(&schema, vec!["Next".into(), Value::Int(2)])
            .unwrap_err();

        assert!(matches!(err, DbError::IdExhausted));
        assert_eq!(rows, before);
    }

    #[test]
    fn test_arity_mismatch() {
        let (schema, mut rows) = populated();
        let before = rows.clone();

        let err = rows.insert(&schema, vec!["Solo".into()]).unwrap_err();
        assert!(matches!(
            err,
            DbError::ArityMismatch {
                expected: 2,
                found: 1
            }
        ));

        let err = rows
            .insert(&schema, vec!["A".into(), Value::Int(1), Value::Int(2)])
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::ArityMismatch {
                expected: 2,
                found: 3
            }
        ));

        assert_eq!(rows, before);
    }

    #[test]
    fn test_type_mismatch() {
        let (schema, mut rows) = populated();
        let before = rows.clone();

        let err = rows
            .insert(&schema, vec!["Zed".into(), "thirty".into()])
            .unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));

        let err = rows
            .insert(&schema, vec!["Zed".into(), Value::Bool(true)])
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::TypeMismatch {
                expected: crate::DataType::Int,
                found: crate::DataType::Bool
            }
        ));

        assert_eq!(rows, before);
    }

    #[test]
    fn test_type_mismatch_reports_first_bad_value() {
        let (schema, mut rows) = populated();

        let err = rows
            .insert(&schema, vec![Value::Int(1), "x".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::TypeMismatch {
                expected: crate::DataType::Str,
                found: crate::DataType::Int
            }
        ));
    }

    #[test]
    fn test_select_all_and_filtered() {
        let (_, rows) = populated();

        assert_eq!(rows.select(None).len(), 3);

        let bob = Predicate::new().with("name", "Bob");
        assert_eq!(ids(&rows.select(Some(&bob))), vec![2]);

        let twenty_five = Predicate::new().with("age", Value::Int(25));
        assert_eq!(ids(&rows.select(Some(&twenty_five))), vec![2, 3]);

        let nobody = Predicate::new().with("age", "25");
        assert!(rows.select(Some(&nobody)).is_empty());
    }

    #[test]
    fn test_update_matching_rows() {
        let (schema, mut rows) = populated();

        let mut set = Assignments::new();
        set.insert("age".into(), Value::Int(26));
        let count = rows
            .update(&schema, &set, &Predicate::new().with("name", "Bob"))
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(rows.records()[1].get("age"), Some(&Value::Int(26)));
        assert_eq!(rows.records()[2].get("age"), Some(&Value::Int(25)));
    }

    #[test]
    fn test_update_never_touches_id() {
        let (schema, mut rows) = populated();

        let mut set = Assignments::new();
        set.insert("ID".into(), Value::Int(999));
        set.insert("nickname".into(), "Al".into());
        let count = rows
            .update(&schema, &set, &Predicate::new().with("ID", Value::Int(1)))
            .unwrap();

        assert_eq!(count, 1);
        let first = &rows.records()[0];
        assert_eq!(first.id(), Some(1));
        assert!(!first.contains("nickname"));
    }

    #[test]
    fn test_update_validates_types() {
        let (schema, mut rows) = populated();
        let before = rows.clone();

        let mut set = Assignments::new();
        set.insert("name".into(), "Robert".into());
        set.insert("age".into(), "old".into());
        let err = rows
            .update(&schema, &set, &Predicate::new().with("name", "Bob"))
            .unwrap_err();

        assert!(matches!(err, DbError::TypeMismatch { .. }));
        assert_eq!(rows, before);
    }

    #[test]
    fn test_update_no_match() {
        let (schema, mut rows) = populated();
        let before = rows.clone();

        let mut set = Assignments::new();
        set.insert("age".into(), Value::Int(1));
        let count = rows
            .update(&schema, &set, &Predicate::new().with("name", "Nobody"))
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_delete_keeps_order() {
        let (_, mut rows) = populated();
        let predicate = Predicate::new().with("age", Value::Int(30));

        let removed = rows.delete(&predicate);

        assert_eq!(removed, 1);
        assert!(rows.select(Some(&predicate)).is_empty());
        assert_eq!(ids(&rows.select(None)), vec![2, 3]);
    }

    #[test]
    fn test_delete_multiple_and_none() {
        let (_, mut rows) = populated();

        assert_eq!(rows.delete(&Predicate::new().with("name", "Nobody")), 0);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows.delete(&Predicate::new().with("age", Value::Int(25))), 2);
        assert_eq!(ids(&rows.select(None)), vec![1]);
    }

    #[test]
    fn test_rows_json_layout() {
        let (_, rows) = populated();
        let json = serde_json::to_string(&rows).unwrap();

        assert!(json.starts_with(r#"[{"ID":1,"name":"Alice","age":30},"#));

        let parsed: RowSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rows);
    }

    proptest! {
        #[test]
        fn prop_new_id_exceeds_every_existing_id(
            ages in proptest::collection::vec(0i64..5, 1..20),
            doomed in 0i64..5,
        ) {
            let schema = users();
            let mut rows = RowSet::new();
            for age in &ages {
                rows.insert(&schema, vec!["x".into(), Value::Int(*age)]).unwrap();
            }
            rows.delete(&Predicate::new().with("age", Value::Int(doomed)));

            let highest = rows.records().iter().filter_map(Record::id).max();
            let id = rows.insert(&schema, vec!["y".into(), Value::Int(0)]).unwrap();

            prop_assert_eq!(id, highest.map_or(1, |h| h + 1));
            let all = rows.select(None);
            prop_assert!(ids(&all).windows(2).all(|w| w[0] < w[1]));
        }
    }
}
