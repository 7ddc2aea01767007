//! Command-line front end: argument handling and the database commands.
use crate::config::{default_config_path, load_config, Config};
use crate::core::db::{ConnectionManager, Row};
use crate::core::{ClitoolsError, Result};
use rusqlite::types::Value;
use std::io::Write;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: clitools [-v] [--config PATH] [--dsn DSN] [--user USER] [--password PASS] <command>

commands:
  ping                    check the database answers
  databases               list databases
  tables <db>             list tables of a database
  exists <db> [table]     check a database or table exists
  query <sql>             run a query, print rows as JSON lines
  exec <sql>              run a statement, print the affected row count";

/// A database command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Databases,
    Tables(String),
    Exists { database: String, table: Option<String> },
    Query(String),
    Exec(String),
}

/// Parsed command line
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub dsn: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub command: Option<Command>,
}

impl Options {
    /// Parses arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter().map(Into::into);
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-v" | "--verbose" => options.verbose = true,
                "--config" => options.config = Some(PathBuf::from(flag_value(&arg, args.next())?)),
                "--dsn" => options.dsn = Some(flag_value(&arg, args.next())?),
                "--user" => options.username = Some(flag_value(&arg, args.next())?),
                "--password" => options.password = Some(flag_value(&arg, args.next())?),
                _ if arg.starts_with("--") => {
                    return Err(ClitoolsError::Usage(format!("unknown option {}", arg)))
                }
                _ => positional.push(arg),
            }
        }

        options.command = parse_command(positional)?;
        Ok(options)
    }

    /// Loads the config file (explicit path, else the default one if it
    /// exists) and lets command-line flags override it.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => load_config(path)?,
                None => Config::default(),
            },
        };

        if self.dsn.is_some() {
            config.database.dsn = self.dsn.clone();
        }
        if self.username.is_some() {
            config.database.username = self.username.clone();
        }
        if self.password.is_some() {
            config.database.password = self.password.clone();
        }
        Ok(config)
    }
}

fn flag_value(flag: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| ClitoolsError::Usage(format!("{} needs a value", flag)))
}

fn parse_command(positional: Vec<String>) -> Result<Option<Command>> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let mut arg = |what: &str| {
        words
            .next()
            .ok_or_else(|| ClitoolsError::Usage(format!("{} needs {}", name, what)))
    };

    let command = match name.as_str() {
        "ping" => Command::Ping,
        "databases" => Command::Databases,
        "tables" => Command::Tables(arg("a database name")?),
        "exists" => {
            let database = arg("a database name")?;
            Command::Exists { database, table: arg("").ok() }
        }
        "query" => Command::Query(arg("an SQL query")?),
        "exec" => Command::Exec(arg("an SQL statement")?),
        other => return Err(ClitoolsError::Usage(format!("unknown command {}", other))),
    };
    Ok(Some(command))
}

/// Converts a column value to JSON. Blobs are rendered as a placeholder.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => serde_json::Value::String(format!("<BLOB: {} bytes>", b.len())),
    }
}

fn row_to_json(row: &Row) -> serde_json::Value {
    let object = row
        .iter()
        .map(|(column, value)| (column.clone(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

/// Runs one command, writing its output to `out`.
pub fn execute<W: Write>(manager: &mut ConnectionManager, command: &Command, out: &mut W) -> Result<()> {
    match command {
        Command::Ping => {
            manager.ping()?;
            writeln!(out, "ok")?;
        }
        Command::Databases => {
            for name in manager.database_list()? {
                writeln!(out, "{}", name)?;
            }
        }
        Command::Tables(database) => {
            for name in manager.table_list(database)? {
                writeln!(out, "{}", name)?;
            }
        }
        Command::Exists { database, table } => {
            let exists = match table {
                Some(table) => manager.table_exists(database, table)?,
                None => manager.database_exists(database)?,
            };
            writeln!(out, "{}", exists)?;
        }
        Command::Query(sql) => {
            for row in manager.query(sql, [])? {
                writeln!(out, "{}", serde_json::to_string(&row_to_json(&row))?)?;
            }
        }
        Command::Exec(sql) => {
            let affected = manager.exec(sql, [])?;
            writeln!(out, "{}", affected)?;
        }
    }
    Ok(())
}
