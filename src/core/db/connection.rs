/// Connection Management Module
///
/// Holds the connection parameters and a single, lazily opened database
/// handle. Changing the parameters drops the cached handle; the next
/// operation opens a fresh one.

use crate::core::db::log::{QueryLog, TracingLog};
use crate::core::{ClitoolsError, Result};
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Optional PDO-style driver prefix accepted in front of a DSN
const DSN_PREFIX: &str = "sqlite:";

/// Session setup applied to every new connection
const SESSION_SETUP: &str = "
    PRAGMA encoding = 'UTF-8';
    PRAGMA foreign_keys = ON;
    PRAGMA legacy_alter_table = OFF;
    PRAGMA trusted_schema = OFF;
";

/// Connection parameters
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Database location: a file path, `:memory:` or a `file:` URI
    pub dsn: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// The DSN without any `sqlite:` prefix
    pub fn path(&self) -> &str {
        self.dsn.strip_prefix(DSN_PREFIX).unwrap_or(&self.dsn)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dsn", &self.dsn)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Owner of the connection parameters and the single cached connection.
///
/// A manager is created by the caller's top-level context and passed by
/// reference into every data-access call. It performs no internal locking;
/// callers sharing one across threads must serialize access themselves.
pub struct ConnectionManager {
    config: ConnectionConfig,
    connection: Option<Connection>,
    pub(crate) log: Arc<dyn QueryLog>,
}

impl ConnectionManager {
    /// Creates an unconfigured manager logging through `tracing`
    pub fn new() -> Self {
        Self::with_log(Arc::new(TracingLog))
    }

    /// Creates an unconfigured manager reporting to the given log
    pub fn with_log(log: Arc<dyn QueryLog>) -> Self {
        ConnectionManager {
            config: ConnectionConfig::default(),
            connection: None,
            log,
        }
    }

    /// Stores the connection parameters.
    ///
    /// Absent username or password leave the stored value untouched. The
    /// cached connection is always dropped, even if nothing changed.
    pub fn configure(&mut self, dsn: &str, username: Option<&str>, password: Option<&str>) {
        self.config.dsn = dsn.to_string();
        if let Some(username) = username {
            self.config.username = Some(username.to_string());
        }
        if let Some(password) = password {
            self.config.password = Some(password.to_string());
        }
        self.connection = None;
    }

    /// The current connection parameters
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Whether a connection is currently cached
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the cached connection, opening it first if needed.
    ///
    /// A failed attempt leaves the cache empty, so the next call retries
    /// from scratch.
    ///
    /// # Errors
    ///
    /// Returns `ClitoolsError::Connection` naming the DSN and user.
    pub fn connection(&mut self) -> Result<&Connection> {
        let conn = match self.connection.take() {
            Some(conn) => conn,
            None => open_connection(&self.config)?,
        };
        Ok(&*self.connection.insert(conn))
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("connected", &self.connection.is_some())
            .finish()
    }
}

fn open_connection(config: &ConnectionConfig) -> Result<Connection> {
    let connection_error = |source| ClitoolsError::Connection {
        dsn: config.dsn.clone(),
        username: config.username.clone().unwrap_or_default(),
        source,
    };

    let path = config.path();
    if path.is_empty() {
        return Err(connection_error(rusqlite::Error::InvalidPath(PathBuf::new())));
    }

    let conn = Connection::open(path).map_err(connection_error)?;
    conn.execute_batch(SESSION_SETUP).map_err(connection_error)?;

    debug!(dsn = %config.dsn, "opened database connection");
    Ok(conn)
}
