//! A flat-file table store driven by a line-oriented command language.
//!
//! Table schemas live in one JSON document and each table's rows in another.
//! Every command loads what it needs, applies one operation in memory and
//! writes back what changed.

pub mod ast;
pub mod clause;
pub mod config;
pub mod data_type;
pub mod database;
pub mod display;
pub mod error;
pub mod filter;
pub mod parser;
pub mod record;
pub mod schema;
pub mod storage;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use ast::Command;
pub use config::Config;
pub use data_type::DataType;
pub use database::{Database, Outcome};
pub use error::{DbError, Result};
pub use filter::Predicate;
pub use record::Record;
pub use schema::{ColumnDef, Schema, SchemaStore, TableInfo};
pub use storage::{JsonStorage, MemoryStorage, Storage};
pub use table::{Assignments, RowSet};
pub use value::{Value, validate_value};
