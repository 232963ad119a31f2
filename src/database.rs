use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use indexmap::IndexMap;

use crate::{
    ast::{Command, HELP},
    config::Config,
    display::{render_rows, render_tables},
    error::Result,
    filter::Predicate,
    parser::parse_command,
    record::Record,
    schema::TableInfo,
    storage::{JsonStorage, Storage},
    table::RowSet,
};

/// The entry point of the engine: runs commands against a [Storage].
///
/// Every command reloads what it needs from storage, applies one operation
/// to the in-memory schema store or row set, and writes back what changed
/// only if the operation succeeded.
pub struct Database<S: Storage> {
    storage: S,
    cache: QueryCache,
}

/// The result of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created { table: String },
    Dropped { table: String },
    Tables(Vec<String>),
    Inserted { table: String, id: i64 },
    /// Selected records, with the column names of the table in schema order.
    Rows { columns: Vec<String>, records: Vec<Record> },
    Updated { count: usize },
    Deleted { count: usize },
    Info(TableInfo),
    Help,
    Exit,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Created { table } => write!(f, "Table \"{table}\" created."),
            Outcome::Dropped { table } => write!(f, "Table \"{table}\" dropped."),
            Outcome::Tables(names) => f.write_str(&render_tables(names.as_slice())),
            Outcome::Inserted { table, id } => {
                write!(f, "Record with ID={id} inserted into \"{table}\".")
            }
            Outcome::Rows { columns, records } => {
                let rows: Vec<&Record> = records.iter().collect();
                f.write_str(&render_rows(columns, &rows))
            }
            Outcome::Updated { count } => write!(f, "Updated {count} record(s)."),
            Outcome::Deleted { count } => write!(f, "Deleted {count} record(s)."),
            Outcome::Info(info) => write!(f, "{info}"),
            Outcome::Help => f.write_str(HELP),
            Outcome::Exit => f.write_str("Goodbye!"),
        }
    }
}

/// Most `select` results kept per table; the oldest entry goes first.
const MAX_CACHED_PER_TABLE: usize = 32;

/// Memoized `select` results, grouped by table so that a change to one
/// table drops only that table's entries.
///
/// Entries only go stale through this engine's own writes, so the cache is
/// off unless the documents have no other writer.
#[derive(Debug)]
struct QueryCache {
    enabled: bool,
    tables: HashMap<String, IndexMap<String, Vec<Record>>>,
}

impl QueryCache {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            tables: HashMap::new(),
        }
    }

    fn key(filter: Option<&Predicate>) -> String {
        format!("{filter:?}")
    }

    fn get(&self, table: &str, filter: Option<&Predicate>) -> Option<&Vec<Record>> {
        if !self.enabled {
            return None;
        }
        self.tables.get(table)?.get(&Self::key(filter))
    }

    fn put(&mut self, table: &str, filter: Option<&Predicate>, records: Vec<Record>) {
        if !self.enabled {
            return;
        }

        let entries = self.tables.entry(table.to_string()).or_default();
        let key = Self::key(filter);
        if !entries.contains_key(&key) && entries.len() >= MAX_CACHED_PER_TABLE {
            entries.shift_remove_index(0);
        }
        entries.insert(key, records);
    }

    fn invalidate(&mut self, table: &str) {
        self.tables.remove(table);
    }

    fn len(&self) -> usize {
        self.tables.values().map(IndexMap::len).sum()
    }
}

impl Database<JsonStorage> {
    /// Opens the JSON documents named by `config`.
    pub fn open(config: &Config) -> Self {
        Database::new(JsonStorage::from_config(config)).with_cache(config.cache_selects)
    }
}

impl<S: Storage> Database<S> {
    /// Creates a database over `storage`, with the select cache disabled.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cache: QueryCache::new(false),
        }
    }

    /// Enables or disables memoization of `select` results.
    ///
    /// Only enable it when nothing else writes to the storage: cached
    /// results are dropped on this engine's writes and no others.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = QueryCache::new(enabled);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Number of memoized `select` results.
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    /// Parses and runs one command line.
    ///
    /// # Errors
    /// Returns an error if the line is not a valid command or the command
    /// itself fails; storage is then left as it was.
    ///
    /// # Example
    /// ```
    /// use flatdb::{Database, MemoryStorage, Outcome, Value};
    ///
    /// let mut db = Database::new(MemoryStorage::new());
    /// db.execute("create_table users name:str age:int").unwrap();
    /// db.execute(r#"insert into users values ("Alice", 30)"#).unwrap();
    ///
    /// let outcome = db.execute("select from users where age = 30").unwrap();
    /// match outcome {
    ///     Outcome::Rows { records, .. } => {
    ///         assert_eq!(records.len(), 1);
    ///         assert_eq!(records[0].get("name"), Some(&Value::Str("Alice".into())));
    ///     }
    ///     other => panic!("unexpected outcome {other:?}"),
    /// }
    /// ```
    pub fn execute(&mut self, line: &str) -> Result<Outcome> {
        let command = parse_command(line)?;
        self.run(command)
    }

    /// Runs a parsed command, logging how long it took.
    pub fn run(&mut self, command: Command) -> Result<Outcome> {
        let verb = command.verb();
        let started = Instant::now();

        let outcome = self.dispatch(command);

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &outcome {
            Ok(_) => tracing::info!(command = verb, elapsed_ms, "command finished"),
            Err(e) => tracing::info!(command = verb, elapsed_ms, error = %e, "command failed"),
        }

        outcome
    }

    fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::CreateTable { name, columns } => self.create_table(name, &columns),
            Command::DropTable { name } => self.drop_table(name),
            Command::ListTables => {
                let schemas = self.storage.load_schemas();
                let names = schemas.list_tables().into_iter().map(String::from).collect();
                Ok(Outcome::Tables(names))
            }
            Command::Insert { table, values } => {
                let schemas = self.storage.load_schemas();
                let schema = schemas.schema(&table)?;
                let mut rows = self.storage.load_rows(&table);

                let id = rows.insert(schema, values)?;
                self.save_rows(&table, &rows)?;

                Ok(Outcome::Inserted { table, id })
            }
            Command::Select { table, filter } => self.select(table, filter),
            Command::Update {
                table,
                assignments,
                filter,
            } => {
                let schemas = self.storage.load_schemas();
                let schema = schemas.schema(&table)?;
                let mut rows = self.storage.load_rows(&table);

                let count = rows.update(schema, &assignments, &filter)?;
                if count > 0 {
                    self.save_rows(&table, &rows)?;
                }

                Ok(Outcome::Updated { count })
            }
            Command::Delete { table, filter } => {
                let schemas = self.storage.load_schemas();
                schemas.schema(&table)?;
                let mut rows = self.storage.load_rows(&table);

                let count = rows.delete(&filter);
                if count > 0 {
                    self.save_rows(&table, &rows)?;
                }

                Ok(Outcome::Deleted { count })
            }
            Command::Info { table } => {
                let schemas = self.storage.load_schemas();
                schemas.schema(&table)?;
                let rows = self.storage.load_rows(&table);

                Ok(Outcome::Info(schemas.table_info(&table, rows.len())?))
            }
            Command::Help => Ok(Outcome::Help),
            Command::Exit => Ok(Outcome::Exit),
        }
    }

    fn create_table(&mut self, name: String, columns: &[String]) -> Result<Outcome> {
        let mut schemas = self.storage.load_schemas();
        schemas.create_table(&name, columns)?;

        // Rows first, so a failed write never leaves a schema without rows.
        self.save_rows(&name, &RowSet::new())?;
        self.storage.save_schemas(&schemas)?;

        Ok(Outcome::Created { table: name })
    }

    fn drop_table(&mut self, name: String) -> Result<Outcome> {
        let mut schemas = self.storage.load_schemas();
        schemas.drop_table(&name)?;

        self.storage.save_schemas(&schemas)?;
        self.storage.remove_rows(&name)?;
        self.cache.invalidate(&name);

        Ok(Outcome::Dropped { table: name })
    }

    fn select(&mut self, table: String, filter: Option<Predicate>) -> Result<Outcome> {
        let schemas = self.storage.load_schemas();
        let columns = schemas.schema(&table)?.column_names();

        if let Some(records) = self.cache.get(&table, filter.as_ref()) {
            tracing::debug!(table = %table, "select served from cache");
            return Ok(Outcome::Rows {
                columns,
                records: records.clone(),
            });
        }

        let rows = self.storage.load_rows(&table);
        let records: Vec<Record> = rows.select(filter.as_ref()).into_iter().cloned().collect();
        self.cache.put(&table, filter.as_ref(), records.clone());

        Ok(Outcome::Rows { columns, records })
    }

    fn save_rows(&mut self, table: &str, rows: &RowSet) -> Result<()> {
        self.cache.invalidate(table);
        self.storage.save_rows(table, rows)
    }
}
