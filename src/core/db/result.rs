/// Result Shaping Module
///
/// Convenience readers built on [`ConnectionManager::query`]. Each one runs
/// exactly one query and consumes its result set once.
///
/// Keyed variants return insertion-ordered maps keyed by the textual form
/// of a column value (see [`index_key`]). When two rows produce the same
/// key, the later row wins and the key keeps its first position.

use crate::core::db::connection::ConnectionManager;
use crate::core::db::query::Row;
use crate::core::Result;
use indexmap::IndexMap;
use rusqlite::types::Value;
use rusqlite::Params;

/// Converts a column value into a map key.
///
/// NULL becomes the empty string and blobs are decoded lossily as UTF-8.
pub fn index_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

fn first_value(row: &Row) -> Value {
    row.first().map(|(_, v)| v.clone()).unwrap_or(Value::Null)
}

impl ConnectionManager {
    /// First column of the first row, or `None` when there are no rows.
    pub fn get_one<P: Params>(&mut self, sql: &str, params: P) -> Result<Option<Value>> {
        let mut rows = self.query(sql, params)?;
        Ok(rows.next().map(|row| first_value(&row)))
    }

    /// First row, or `None` when there are no rows.
    pub fn get_row<P: Params>(&mut self, sql: &str, params: P) -> Result<Option<Row>> {
        let mut rows = self.query(sql, params)?;
        Ok(rows.next())
    }

    /// All rows, in result order.
    pub fn get_all<P: Params>(&mut self, sql: &str, params: P) -> Result<Vec<Row>> {
        Ok(self.query(sql, params)?.collect())
    }

    /// All rows keyed by `index_column`, or by the first column when
    /// `index_column` is `None`.
    ///
    /// Rows lacking the named column are keyed by the empty string.
    /// Duplicate keys: last write wins.
    pub fn get_all_with_index<P: Params>(
        &mut self,
        sql: &str,
        params: P,
        index_column: Option<&str>,
    ) -> Result<IndexMap<String, Row>> {
        let mut indexed = IndexMap::new();
        for row in self.query(sql, params)? {
            let key = match index_column {
                Some(column) => row.get(column).map(index_key).unwrap_or_default(),
                None => index_key(&first_value(&row)),
            };
            indexed.insert(key, row);
        }
        Ok(indexed)
    }

    /// First column of every row, in result order.
    pub fn get_col<P: Params>(&mut self, sql: &str, params: P) -> Result<Vec<Value>> {
        Ok(self.query(sql, params)?.map(|row| first_value(&row)).collect())
    }

    /// First column of every row, mapped to itself for membership lookups.
    pub fn get_col_with_index<P: Params>(
        &mut self,
        sql: &str,
        params: P,
    ) -> Result<IndexMap<String, Value>> {
        let mut lookup = IndexMap::new();
        for row in self.query(sql, params)? {
            let value = first_value(&row);
            lookup.insert(index_key(&value), value);
        }
        Ok(lookup)
    }

    /// Two-column rows as a key/value map: first column is the key, second
    /// the value.
    ///
    /// A row with a single column maps its key to NULL; extra columns are
    /// ignored. Columns are read from the [`Row`] map, so two selected
    /// columns sharing a name collapse into one.
    pub fn get_list<P: Params>(&mut self, sql: &str, params: P) -> Result<IndexMap<String, Value>> {
        let mut list = IndexMap::new();
        for row in self.query(sql, params)? {
            let key = index_key(&first_value(&row));
            let value = row.get_index(1).map(|(_, v)| v.clone()).unwrap_or(Value::Null);
            list.insert(key, value);
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::log::{MemoryLog, TAG_QUERY};
    use std::sync::Arc;

    fn setup_manager() -> (ConnectionManager, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::new());
        let mut manager = ConnectionManager::with_log(log.clone());
        manager.configure(":memory:", None, None);
        manager
            .exec_batch(
                "
                CREATE TABLE settings (name TEXT, value TEXT, scope TEXT);
                INSERT INTO settings VALUES ('timeout', '30', 'global');
                INSERT INTO settings VALUES ('retries', '3', 'global');
                INSERT INTO settings VALUES ('timeout', '60', 'local');
            ",
            )
            .unwrap();
        log.clear();
        (manager, log)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_get_one() {
        let (mut manager, _log) = setup_manager();

        let value = manager
            .get_one("SELECT value, scope FROM settings WHERE name = ?1 ORDER BY rowid", ["timeout"])
            .unwrap();
        assert_eq!(value, Some(text("30")));
    }

    #[test]
    fn test_get_one_empty_is_none() {
        let (mut manager, _log) = setup_manager();

        let value = manager
            .get_one("SELECT value FROM settings WHERE name = 'missing'", [])
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_get_one_null_is_not_none() {
        let (mut manager, _log) = setup_manager();
        assert_eq!(manager.get_one("SELECT NULL", []).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_get_row() {
        let (mut manager, _log) = setup_manager();

        let row = manager
            .get_row("SELECT name, value FROM settings ORDER BY rowid", [])
            .unwrap()
            .unwrap();
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["name", "value"]);
        assert_eq!(row["value"], text("30"));

        assert!(manager
            .get_row("SELECT * FROM settings WHERE 1=0", [])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_get_all() {
        let (mut manager, _log) = setup_manager();

        let rows = manager.get_all("SELECT * FROM settings ORDER BY rowid", []).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2]["scope"], text("local"));
        assert!(manager.get_all("SELECT * FROM settings WHERE 1=0", []).unwrap().is_empty());
    }

    #[test]
    fn test_get_all_with_index_last_write_wins() {
        let (mut manager, _log) = setup_manager();

        let indexed = manager
            .get_all_with_index("SELECT name, value FROM settings ORDER BY rowid", [], None)
            .unwrap();
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed["timeout"]["value"], text("60"));
        // the overwritten key keeps its original position
        let keys: Vec<&str> = indexed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["timeout", "retries"]);
    }

    #[test]
    fn test_get_all_with_named_index() {
        let (mut manager, _log) = setup_manager();

        let indexed = manager
            .get_all_with_index("SELECT * FROM settings ORDER BY rowid", [], Some("scope"))
            .unwrap();
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed["global"]["name"], text("retries"));
        assert_eq!(indexed["local"]["value"], text("60"));

        let missing = manager
            .get_all_with_index("SELECT * FROM settings", [], Some("nope"))
            .unwrap();
        assert_eq!(missing.len(), 1);
        assert!(missing.contains_key(""));
    }

    #[test]
    fn test_get_col() {
        let (mut manager, _log) = setup_manager();

        let names = manager.get_col("SELECT name FROM settings ORDER BY rowid", []).unwrap();
        assert_eq!(names, vec![text("timeout"), text("retries"), text("timeout")]);
    }

    #[test]
    fn test_get_col_with_index() {
        let (mut manager, _log) = setup_manager();

        let lookup = manager.get_col_with_index("SELECT name FROM settings", []).unwrap();
        assert_eq!(lookup.len(), 2);
        assert!(lookup.contains_key("retries"));
        assert_eq!(lookup["timeout"], text("timeout"));
    }

    #[test]
    fn test_get_list_single_query() {
        let (mut manager, log) = setup_manager();

        let list = manager
            .get_list("SELECT name, value FROM settings WHERE scope = 'global'", [])
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list["timeout"], text("30"));
        assert_eq!(list["retries"], text("3"));
        assert_eq!(log.with_tag(TAG_QUERY).len(), 1);
    }

    #[test]
    fn test_get_list_single_column() {
        let (mut manager, _log) = setup_manager();

        let list = manager.get_list("SELECT DISTINCT name FROM settings", []).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list["retries"], Value::Null);
    }

    #[test]
    fn test_get_list_same_named_columns() {
        let (mut manager, _log) = setup_manager();

        // both columns are "name"; the row keeps one, holding the value
        let list = manager
            .get_list("SELECT name, value AS name FROM settings WHERE scope = 'local'", [])
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list["60"], Value::Null);
    }

    #[test]
    fn test_mapper_propagates_query_error() {
        let (mut manager, _log) = setup_manager();
        assert!(manager.get_all("SELECT * FROM nowhere", []).is_err());
        assert!(manager.get_one("SELEC 1", []).is_err());
    }

    #[test]
    fn test_index_key() {
        assert_eq!(index_key(&Value::Null), "");
        assert_eq!(index_key(&Value::Integer(7)), "7");
        assert_eq!(index_key(&Value::Real(2.5)), "2.5");
        assert_eq!(index_key(&Value::Blob(b"ab".to_vec())), "ab");
    }
}
