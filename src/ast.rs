use crate::Value;
use crate::filter::Predicate;
use crate::table::Assignments;

/// Text printed by the `help` command.
pub const HELP: &str = "\
Commands:
  create_table <name> <column:type> ...   create a table (types: int, str, bool)
  drop_table <name>                       delete a table and its rows
  list_tables                             list all tables
  insert into <table> values (<v>, ...)   add a record
  select from <table> [where <col> = <v>] read records
  update <table> set <col> = <v>, ... where <col> = <v>
                                          change records
  delete from <table> where <col> = <v>   remove records
  info <table>                            describe a table
  help                                    show this text
  exit                                    leave the program";

/// One parsed line of the command interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        name: String,
        /// Raw `name:type` definitions, validated by the schema store.
        columns: Vec<String>,
    },
    DropTable {
        name: String,
    },
    ListTables,
    Insert {
        table: String,
        values: Vec<Value>,
    },
    Select {
        table: String,
        filter: Option<Predicate>,
    },
    Update {
        table: String,
        assignments: Assignments,
        filter: Predicate,
    },
    Delete {
        table: String,
        filter: Predicate,
    },
    Info {
        table: String,
    },
    Help,
    Exit,
}

impl Command {
    /// The verb that introduces this command on the command line.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "create_table",
            Self::DropTable { .. } => "drop_table",
            Self::ListTables => "list_tables",
            Self::Insert { .. } => "insert",
            Self::Select { .. } => "select",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Info { .. } => "info",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    /// Commands that irreversibly remove data and ask for confirmation first.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::DropTable { .. } | Self::Delete { .. })
    }
}
