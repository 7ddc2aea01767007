/// Clitools Error Module
///
/// This module defines the error types shared by the database layer, the
/// configuration loader and the command-line front end.
use thiserror::Error;

/// Error type for the clitools crate.
///
/// Connection and query failures carry enough context (DSN, user, SQL text)
/// to be reported without consulting the log. Credentials other than the
/// username never appear in a rendered message.
#[derive(Error, Debug)]
pub enum ClitoolsError {
    /// The database connection could not be established
    #[error("Cannot connect to \"{dsn}\" with user \"{username}\": {source}")]
    Connection {
        dsn: String,
        username: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A query or statement failed to prepare or execute
    #[error("Query failed: {source} (sql: {sql})")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line usage
    #[error("Usage error: {0}")]
    Usage(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClitoolsError {
    /// Wraps a driver error raised while running `sql`.
    pub fn query(sql: &str, source: rusqlite::Error) -> Self {
        ClitoolsError::Query {
            sql: sql.to_string(),
            source,
        }
    }

    /// The SQL text of a failed query, if this is a query error.
    pub fn sql(&self) -> Option<&str> {
        match self {
            ClitoolsError::Query { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

/// Type alias for Result to use ClitoolsError as the error type.
pub type Result<T> = std::result::Result<T, ClitoolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let conn_err = ClitoolsError::Connection {
            dsn: "/srv/app.db".to_string(),
            username: "backup".to_string(),
            source: rusqlite::Error::InvalidQuery,
        };
        let msg = conn_err.to_string();
        assert!(msg.contains("/srv/app.db"));
        assert!(msg.contains("backup"));

        let query_err = ClitoolsError::query("SELECT nope", rusqlite::Error::InvalidQuery);
        assert!(query_err.to_string().contains("SELECT nope"));
        assert_eq!(query_err.sql(), Some("SELECT nope"));

        let config_err = ClitoolsError::Config("missing dsn".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
        assert_eq!(config_err.sql(), None);
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClitoolsError = io_err.into();
        match err {
            ClitoolsError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let json_err: std::result::Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{ invalid json }");
        let err: ClitoolsError = json_err.unwrap_err().into();
        match err {
            ClitoolsError::Json(_) => {}
            _ => panic!("Expected JSON error"),
        }
    }
}
