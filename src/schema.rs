use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::error::{DbError, Result};

/// Name of the implicit integer key every table starts with.
pub const ID_COLUMN: &str = "ID";

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

/// Parses the textual `name:type` form used by `create_table`.
impl FromStr for ColumnDef {
    type Err = DbError;

    fn from_str(def: &str) -> Result<Self> {
        let (name, data_type) = def
            .split_once(':')
            .ok_or_else(|| DbError::MalformedColumn(def.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DbError::EmptyColumnName);
        }

        let data_type = data_type.parse::<DataType>()?;

        if name == ID_COLUMN {
            return Err(DbError::ReservedColumn);
        }
        if !is_identifier(name) {
            return Err(DbError::InvalidColumnName(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            data_type,
        })
    }
}

/// The ordered columns of one table, `ID:int` first.
///
/// Persisted as a JSON object mapping column name to type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: IndexMap<String, DataType>,
}

impl Schema {
    /// Builds a schema from user columns, prepending `ID:int`.
    ///
    /// # Errors
    /// Returns [DbError::ReservedColumn] if a definition is named `ID` and
    /// [DbError::DuplicateColumn] if a name appears twice.
    pub fn new(user_columns: Vec<ColumnDef>) -> Result<Self> {
        let mut columns = IndexMap::with_capacity(user_columns.len() + 1);
        columns.insert(ID_COLUMN.to_string(), DataType::Int);

        for column in user_columns {
            if column.name == ID_COLUMN {
                return Err(DbError::ReservedColumn);
            }
            if columns.contains_key(&column.name) {
                return Err(DbError::DuplicateColumn(column.name));
            }
            columns.insert(column.name, column.data_type);
        }

        Ok(Self { columns })
    }

    /// All columns in declaration order, `ID` included.
    pub fn columns(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// The columns a user supplies values for, in declaration order.
    pub fn user_columns(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.columns().filter(|(name, _)| *name != ID_COLUMN)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn column_type(&self, name: &str) -> Option<DataType> {
        self.columns.get(name).copied()
    }

    /// Number of columns, `ID` included.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// All table schemas, keyed by table name in creation order.
///
/// This is the content of the metadata document. It is loaded before each
/// command and written back after each schema change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaStore {
    tables: IndexMap<String, Schema>,
}

impl SchemaStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new table from `name:type` column definitions.
    ///
    /// # Errors
    /// - [DbError::InvalidName] if `name` is not a valid identifier.
    /// - [DbError::AlreadyExists] if the table is already registered.
    /// - Any column definition error, checked in declaration order.
    ///
    /// Nothing is registered when an error is returned.
    ///
    /// # Example
    /// ```
    /// # use flatdb::{DataType, SchemaStore};
    /// let mut store = SchemaStore::new();
    /// let schema = store.create_table("users", &["name:str", "age:int"]).unwrap();
    ///
    /// let columns: Vec<_> = schema.columns().collect();
    /// assert_eq!(columns[0], ("ID", DataType::Int));
    /// assert_eq!(columns[2], ("age", DataType::Int));
    /// ```
    pub fn create_table<S: AsRef<str>>(&mut self, name: &str, column_defs: &[S]) -> Result<&Schema> {
        validate_table_name(name)?;
        if self.tables.contains_key(name) {
            return Err(DbError::AlreadyExists(name.to_string()));
        }

        let columns = column_defs
            .iter()
            .map(|def| def.as_ref().parse::<ColumnDef>())
            .collect::<Result<Vec<_>>>()?;
        let schema = Schema::new(columns)?;

        let schema: &Schema = self.tables.entry(name.to_string()).or_insert(schema);
        Ok(schema)
    }

    /// Removes a table, keeping the order of the remaining ones.
    ///
    /// # Errors
    /// Returns [DbError::NotFound] if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<Schema> {
        self.tables
            .shift_remove(name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    /// Returns the table names in creation order.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.tables.get(name)
    }

    /// Like [SchemaStore::get] but reports a missing table as an error.
    pub fn schema(&self, name: &str) -> Result<&Schema> {
        self.get(name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Summarizes a table's columns together with its current row count.
    pub fn table_info(&self, name: &str, row_count: usize) -> Result<TableInfo> {
        let schema = self.schema(name)?;
        Ok(TableInfo {
            name: name.to_string(),
            columns: schema
                .columns()
                .map(|(column, ty)| (column.to_string(), ty))
                .collect(),
            row_count,
        })
    }
}

/// Derived description of a table, see [SchemaStore::table_info].
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<(String, DataType)>,
    pub row_count: usize,
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(|(name, ty)| format!("{name}:{ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Table: {}", self.name)?;
        writeln!(f, "Columns: {columns}")?;
        write!(f, "Rows: {}", self.row_count)
    }
}

/// Checks that `name` can be used as a table name.
///
/// # Errors
/// Returns [DbError::InvalidName] for an empty name or one that is not a
/// bare identifier.
pub fn validate_table_name(name: &str) -> Result<()> {
    if !is_identifier(name) {
        return Err(DbError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Letters, digits and underscores, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
