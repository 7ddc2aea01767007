use crate::core::db::ConnectionManager;
use crate::core::{ClitoolsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSection,
    pub logging: Option<LoggingSection>,
}

/// Database connection settings.
#[derive(Default, Deserialize)]
pub struct DatabaseSection {
    pub dsn: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for DatabaseSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSection")
            .field("dsn", &self.dsn)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DatabaseSection {
    /// Hands the settings to a connection manager.
    ///
    /// # Errors
    ///
    /// Returns `ClitoolsError::Config` when no DSN is set.
    pub fn apply(&self, manager: &mut ConnectionManager) -> Result<()> {
        let dsn = self
            .dsn
            .as_deref()
            .filter(|dsn| !dsn.is_empty())
            .ok_or_else(|| ClitoolsError::Config("no database dsn configured".to_string()))?;
        manager.configure(dsn, self.username.as_deref(), self.password.as_deref());
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    /// A `tracing` filter directive such as `info` or `clitools=debug`
    pub level: Option<String>,
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| ClitoolsError::Config(format!("{}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| ClitoolsError::Config(e.to_string()))
}

/// `<config dir>/clitools/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clitools").join("config.toml"))
}
