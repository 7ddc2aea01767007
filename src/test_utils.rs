/// # Test Utilities Module
///
/// Fixtures for database-layer tests: a connection manager bound to a
/// throwaway database file, seeded with a small schema, with its query log
/// captured in memory.

use crate::core::db::{ConnectionManager, MemoryLog};
use crate::core::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Isolated database test fixture
pub struct DatabaseFixture {
    pub manager: ConnectionManager,
    pub log: Arc<MemoryLog>,
    dir: TempDir,
}

impl DatabaseFixture {
    /// Creates a manager configured for an empty database file
    pub fn new(name: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let log = Arc::new(MemoryLog::new());
        let mut manager = ConnectionManager::with_log(log.clone());

        let path = dir.path().join(format!("{}.db", name));
        manager.configure(&path.to_string_lossy(), Some("tester"), Some("tester-password"));

        Ok(DatabaseFixture { manager, log, dir })
    }

    /// Creates a fixture with the standard schema and sample rows
    pub fn with_sample_data(name: &str) -> Result<Self> {
        let mut fixture = Self::new(name)?;
        fixture.setup_standard_schema()?;
        fixture.populate_sample_data()?;
        fixture.log.clear();
        Ok(fixture)
    }

    /// Path for an additional database file inside the fixture directory
    pub fn sibling_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{}.db", name))
    }

    fn setup_standard_schema(&mut self) -> Result<()> {
        self.manager.exec_batch(
            "
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                active BOOLEAN DEFAULT TRUE
            );

            CREATE TABLE posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                published BOOLEAN DEFAULT FALSE,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );

            CREATE INDEX idx_posts_user_id ON posts (user_id);
        ",
        )
    }

    fn populate_sample_data(&mut self) -> Result<()> {
        let users = [
            ("alice", "alice@example.com", true),
            ("bob", "bob@example.com", true),
            ("charlie", "charlie@example.com", false),
        ];
        for (username, email, active) in users {
            self.manager.exec(
                "INSERT INTO users (username, email, active) VALUES (?1, ?2, ?3)",
                rusqlite::params![username, email, active],
            )?;
        }

        let posts = [
            (1, "Welcome to Rust", true),
            (2, "My Trip to Paris", false),
            (1, "Building Terminal UIs", true),
        ];
        for (user_id, title, published) in posts {
            self.manager.exec(
                "INSERT INTO posts (user_id, title, published) VALUES (?1, ?2, ?3)",
                rusqlite::params![user_id, title, published],
            )?;
        }

        Ok(())
    }
}
