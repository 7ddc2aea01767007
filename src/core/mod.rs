/// Core Module for clitools
///
/// This module contains the database access layer and the shared error
/// type. Command implementations build on these pieces.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{ClitoolsError, Result};
