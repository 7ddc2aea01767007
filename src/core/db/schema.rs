/// Schema Introspection Module
///
/// Existence checks and listings over SQLite's catalog. A "database" here
/// is a schema attached to the connection (`main`, `temp` and anything
/// added with [`ConnectionManager::attach_database`]).

use crate::core::db::connection::ConnectionManager;
use crate::core::db::result::index_key;
use crate::core::db::sanitize::sanitize_database_name;
use crate::core::Result;
use rusqlite::types::Value;

/// System schemas left out of [`ConnectionManager::database_list`]
pub const SYSTEM_DATABASES: &[&str] = &["temp"];

/// Catalog entry types reported as tables
const TABLE_TYPES: &str = "('table', 'view')";

fn count_of(value: Option<Value>) -> i64 {
    match value {
        Some(Value::Integer(n)) => n,
        _ => 0,
    }
}

impl ConnectionManager {
    /// Whether a database with this name is attached
    pub fn database_exists(&mut self, database: &str) -> Result<bool> {
        let count = self.get_one(
            "SELECT COUNT(*) FROM pragma_database_list WHERE name = ?1",
            [database],
        )?;
        Ok(count_of(count) == 1)
    }

    /// Names of all attached databases except the system ones
    pub fn database_list(&mut self) -> Result<Vec<String>> {
        let names = self.get_col("SELECT name FROM pragma_database_list ORDER BY seq", [])?;
        Ok(names
            .iter()
            .map(index_key)
            .filter(|name| !SYSTEM_DATABASES.contains(&name.as_str()))
            .collect())
    }

    /// Names of the user tables and views in `database`. An unknown
    /// database yields an empty list.
    pub fn table_list(&mut self, database: &str) -> Result<Vec<String>> {
        if !self.database_exists(database)? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT name FROM {}.sqlite_master \
             WHERE type IN {} AND name NOT LIKE 'sqlite_%' ORDER BY name",
            sanitize_database_name(database),
            TABLE_TYPES
        );
        let names = self.get_col(&sql, [])?;
        Ok(names.iter().map(index_key).collect())
    }

    /// Whether a table or view named `table` exists in `database`. An
    /// unknown database yields `false`.
    pub fn table_exists(&mut self, database: &str, table: &str) -> Result<bool> {
        if !self.database_exists(database)? {
            return Ok(false);
        }
        let sql = format!(
            "SELECT COUNT(*) FROM {}.sqlite_master WHERE type IN {} AND name = ?1",
            sanitize_database_name(database),
            TABLE_TYPES
        );
        Ok(count_of(self.get_one(&sql, [table])?) > 0)
    }

    /// Attaches the database file at `path` under `name`. This is the
    /// SQLite counterpart of switching databases on a server.
    pub fn attach_database(&mut self, path: &str, name: &str) -> Result<()> {
        let sql = format!("ATTACH DATABASE ?1 AS {}", sanitize_database_name(name));
        self.exec(&sql, [path]).map(|_| ())
    }

    pub fn detach_database(&mut self, name: &str) -> Result<()> {
        let sql = format!("DETACH DATABASE {}", sanitize_database_name(name));
        self.exec(&sql, []).map(|_| ())
    }
}
