/// Query Execution Module
///
/// Runs statements against the managed connection. Each call is recorded
/// to the query log before it runs, failures are recorded once more, and the
/// error is handed back to the caller unchanged. There is no retry.

use crate::core::db::connection::ConnectionManager;
use crate::core::db::log::{TAG_EXEC, TAG_EXEC_EXCEPTION, TAG_PING, TAG_QUERY, TAG_QUERY_EXCEPTION};
use crate::core::{ClitoolsError, Result};
use indexmap::IndexMap;
use rusqlite::types::Value;
use rusqlite::{Connection, Params};

/// One result record: column name to value, in the driver's column order.
///
/// Keys are column names, so repeated names (`SELECT a.id, b.id ...`)
/// collapse into one entry holding the last value. Alias such columns when
/// every one of them is needed.
pub type Row = IndexMap<String, Value>;

/// A fully fetched, forward-only set of rows.
///
/// Rows are read from the driver before the set is handed out, so a
/// successful query never yields a truncated set.
#[derive(Debug)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ResultSet {
            columns,
            rows: rows.into_iter(),
        }
    }

    /// Column names, in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for ResultSet {}

impl ConnectionManager {
    /// Executes a read query and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns `ClitoolsError::Query` carrying the SQL text if the statement
    /// fails, or `ClitoolsError::Connection` if no connection can be opened.
    pub fn query<P: Params>(&mut self, sql: &str, params: P) -> Result<ResultSet> {
        self.run_logged(TAG_QUERY, TAG_QUERY_EXCEPTION, Some(sql), sql, move |conn| {
            fetch_rows(conn, sql, params)
        })
    }

    /// Executes a mutating statement and returns the number of affected rows.
    ///
    /// Statements that produce rows (`PRAGMA journal_mode = WAL`, a stray
    /// `SELECT`) are stepped to completion, their rows discarded, and
    /// report zero affected rows.
    pub fn exec<P: Params>(&mut self, sql: &str, params: P) -> Result<usize> {
        self.run_logged(TAG_EXEC, TAG_EXEC_EXCEPTION, Some(sql), sql, move |conn| {
            execute_statement(conn, sql, params)
        })
    }

    /// Executes several `;`-separated statements without parameters, as
    /// found in dump files.
    pub fn exec_batch(&mut self, sql: &str) -> Result<()> {
        self.run_logged(TAG_EXEC, TAG_EXEC_EXCEPTION, Some(sql), sql, |conn| {
            conn.execute_batch(sql)
        })
    }

    /// Checks that the server answers a trivial query.
    pub fn ping(&mut self) -> Result<bool> {
        let sql = "SELECT 1";
        self.run_logged(TAG_PING, TAG_QUERY_EXCEPTION, None, sql, |conn| {
            conn.query_row(sql, [], |_| Ok(true))
        })
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.exec("BEGIN TRANSACTION", []).map(|_| ())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.exec("COMMIT", []).map(|_| ())
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.exec("ROLLBACK", []).map(|_| ())
    }

    fn run_logged<T, F>(
        &mut self,
        tag: &str,
        failure_tag: &str,
        payload: Option<&str>,
        sql: &str,
        run: F,
    ) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        self.log.record(tag, payload);

        let result = match self.connection() {
            Ok(conn) => run(conn).map_err(|e| ClitoolsError::query(sql, e)),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.log.record(failure_tag, Some(&e.to_string()));
        }
        result
    }
}

fn execute_statement<P: Params>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(sql)?;
    if stmt.column_count() == 0 {
        return stmt.execute(params);
    }

    let mut rows = stmt.query(params)?;
    while rows.next()?.is_some() {}
    Ok(0)
}

fn fetch_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut records = Vec::new();
    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        let mut record = Row::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            record.insert(name.clone(), row.get::<_, Value>(i)?);
        }
        records.push(record);
    }

    Ok(ResultSet::new(columns, records))
}
