use crate::ast::Command;
use crate::clause::{parse_value_list, require_set, require_where};
use crate::error::{DbError, Result};
use crate::tokenizer::{Token, tokenize};

const CREATE_TABLE: &str = "create_table <name> <column:type> ...";
const DROP_TABLE: &str = "drop_table <name>";
const LIST_TABLES: &str = "list_tables";
const INSERT: &str = "insert into <table> values (<value>, ...)";
const SELECT: &str = "select from <table> [where <column> = <value>]";
const UPDATE: &str = "update <table> set <column> = <value>, ... where <column> = <value>";
const DELETE: &str = "delete from <table> where <column> = <value>";
const INFO: &str = "info <table>";
const HELP: &str = "help";
const EXIT: &str = "exit";

/// Parses one command line.
///
/// # Example
/// ```
/// # use flatdb::{parser::parse_command, Command, Value};
/// let command = parse_command(r#"insert into users values ("Alice", 30)"#).unwrap();
/// assert_eq!(
///     command,
///     Command::Insert {
///         table: "users".into(),
///         values: vec![Value::Str("Alice".into()), Value::Int(30)],
///     }
/// );
/// ```
pub fn parse_command(line: &str) -> Result<Command> {
    Parser::new(line).parse()
}

/// Turns the words of a command line into a [Command].
///
/// Verbs and keywords come from the tokenized words; clause text (value
/// lists, `SET`, `WHERE`) is sliced from the raw line so that quotes reach
/// the clause parser intact.
pub struct Parser<'a> {
    line: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            tokens: tokenize(line),
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Command> {
        let verb = match self.current_token() {
            Some(token) => token.text.to_lowercase(),
            None => return Err(DbError::UnknownCommand(String::new())),
        };
        self.advance();

        match verb.as_str() {
            "create_table" => self.parse_create_table(),
            "drop_table" => self.parse_drop_table(),
            "list_tables" => self.expect_end(LIST_TABLES).map(|_| Command::ListTables),
            "insert" => self.parse_insert(),
            "select" => self.parse_select(),
            "update" => self.parse_update(),
            "delete" => self.parse_delete(),
            "info" => self.parse_info(),
            "help" => self.expect_end(HELP).map(|_| Command::Help),
            "exit" => self.expect_end(EXIT).map(|_| Command::Exit),
            _ => Err(DbError::UnknownCommand(verb)),
        }
    }

    //helpers
    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn consume_keyword(&mut self, keyword: &str, usage: &'static str) -> Result<()> {
        match self.current_token() {
            Some(token) if token.is_keyword(keyword) => {
                self.advance();
                Ok(())
            }
            _ => Err(DbError::Usage(usage)),
        }
    }

    fn consume_name(&mut self, usage: &'static str) -> Result<String> {
        let name = self
            .current_token()
            .map(|token| token.text.clone())
            .ok_or(DbError::Usage(usage))?;
        self.advance();
        Ok(name)
    }

    fn expect_end(&self, usage: &'static str) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(DbError::Usage(usage))
        }
    }

    /// Index of the next unquoted `keyword` at or after the cursor.
    fn find_keyword(&self, keyword: &str) -> Option<usize> {
        (self.position..self.tokens.len()).find(|&i| self.tokens[i].is_keyword(keyword))
    }

    /// Raw text from token `from` to the end of the line.
    fn raw_from(&self, from: usize) -> &'a str {
        match self.tokens.get(from) {
            Some(token) => self.line[token.span.start..].trim(),
            None => "",
        }
    }

    /// Raw text covered by tokens `from..to`.
    fn raw_between(&self, from: usize, to: usize) -> &'a str {
        if from >= to {
            return "";
        }
        let start = self.tokens[from].span.start;
        let end = self.tokens[to - 1].span.end;
        &self.line[start..end]
    }

    // statements
    fn parse_create_table(&mut self) -> Result<Command> {
        let name = self.consume_name(CREATE_TABLE)?;
        let columns = self.tokens[self.position..]
            .iter()
            .map(|token| token.text.clone())
            .collect();
        self.position = self.tokens.len();

        Ok(Command::CreateTable { name, columns })
    }

    fn parse_drop_table(&mut self) -> Result<Command> {
        let name = self.consume_name(DROP_TABLE)?;
        self.expect_end(DROP_TABLE)?;
        Ok(Command::DropTable { name })
    }

    fn parse_insert(&mut self) -> Result<Command> {
        self.consume_keyword("into", INSERT)?;
        let table = self.consume_name(INSERT)?;
        self.consume_keyword("values", INSERT)?;

        let values = parse_value_list(self.raw_from(self.position))?;
        Ok(Command::Insert { table, values })
    }

    fn parse_select(&mut self) -> Result<Command> {
        self.consume_keyword("from", SELECT)?;
        let table = self.consume_name(SELECT)?;

        if self.is_at_end() {
            return Ok(Command::Select {
                table,
                filter: None,
            });
        }

        self.consume_keyword("where", SELECT)?;
        let filter = require_where(self.raw_from(self.position))?;
        Ok(Command::Select {
            table,
            filter: Some(filter),
        })
    }

    fn parse_update(&mut self) -> Result<Command> {
        let table = self.consume_name(UPDATE)?;
        self.consume_keyword("set", UPDATE)?;

        let where_index = self.find_keyword("where").ok_or(DbError::Usage(UPDATE))?;
        let assignments = require_set(self.raw_between(self.position, where_index))?;
        let filter = require_where(self.raw_from(where_index + 1))?;

        self.position = self.tokens.len();
        Ok(Command::Update {
            table,
            assignments,
            filter,
        })
    }

    fn parse_delete(&mut self) -> Result<Command> {
        self.consume_keyword("from", DELETE)?;
        let table = self.consume_name(DELETE)?;
        self.consume_keyword("where", DELETE)?;

        let filter = require_where(self.raw_from(self.position))?;
        Ok(Command::Delete { table, filter })
    }

    fn parse_info(&mut self) -> Result<Command> {
        let table = self.consume_name(INFO)?;
        self.expect_end(INFO)?;
        Ok(Command::Info { table })
    }
}
