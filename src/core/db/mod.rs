/// Database Module
///
/// A minimal procedural façade over a single blocking SQLite connection.
///
/// ## Architecture
///
/// - **Sanitizing** (`sanitize.rs`): identifier stripping and literal quoting
/// - **Connection Management** (`connection.rs`): configuration and the lazily opened handle
/// - **Logging** (`log.rs`): the collaborator every statement is reported to
/// - **Query Execution** (`query.rs`): logged `query`/`exec`/`ping` and transactions
/// - **Result Shaping** (`result.rs`): scalar, row, set, column and keyed variants
/// - **Conditions** (`condition.rs`): WHERE-clause fragment builders
/// - **Schema Introspection** (`schema.rs`): database/table existence and listing
///
/// ## Usage
///
/// ```no_run
/// use clitools::core::db::ConnectionManager;
///
/// let mut db = ConnectionManager::new();
/// db.configure("backup.db", None, None);
/// let tables = db.table_list("main")?;
/// # Ok::<(), clitools::core::ClitoolsError>(())
/// ```
pub mod condition;
pub mod connection;
pub mod log;
pub mod query;
pub mod result;
pub mod sanitize;
pub mod schema;

pub use condition::*;
pub use connection::*;
pub use log::*;
pub use query::*;
pub use result::*;
pub use sanitize::*;
pub use schema::*;
