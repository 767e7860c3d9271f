//! Configuration management for mysqlcmd.
//!
//! Handles loading named connection profiles from a TOML file and filling
//! gaps from the environment variables the stock `mysql` client reads.

use crate::db::{ConnectionString, DEFAULT_PORT, DEFAULT_SERVER};
use crate::error::{MysqlCmdError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure for mysqlcmd.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named database connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Database connection configuration. Every field is optional so profiles,
/// CLI arguments and the environment can each fill in a part.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server host name.
    pub server: Option<String>,

    /// Server port.
    pub port: Option<u16>,

    /// Default database (schema).
    pub database: Option<String>,

    /// Login name.
    pub username: Option<String>,

    /// Login password (not recommended to store in config).
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "*****"))
            .finish()
    }
}

impl ConnectionConfig {
    /// Builds the driver connection string, applying built-in defaults for
    /// the server and port.
    pub fn to_connection_string(&self) -> ConnectionString {
        ConnectionString::build(
            self.server.as_deref().unwrap_or(DEFAULT_SERVER),
            self.database.as_deref().unwrap_or_default(),
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectionConfig) {
        if other.server.is_some() {
            self.server = other.server.clone();
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.database.is_some() {
            self.database = other.database.clone();
        }
        if other.username.is_some() {
            self.username = other.username.clone();
        }
        if other.password.is_some() {
            self.password = other.password.clone();
        }
    }

    /// Applies environment variables (MYSQL_HOST, MYSQL_PWD, etc.) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|key| std::env::var(key).ok());
    }

    /// Fills unset fields from `lookup`, keyed by the `mysql` client's
    /// environment variable names.
    pub fn apply_defaults_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.server.is_none() {
            self.server = lookup("MYSQL_HOST");
        }
        if self.port.is_none() {
            self.port = lookup("MYSQL_TCP_PORT").and_then(|port| port.parse().ok());
        }
        if self.database.is_none() {
            self.database = lookup("MYSQL_DATABASE");
        }
        if self.username.is_none() {
            self.username = lookup("MYSQL_USER");
        }
        if self.password.is_none() {
            self.password = lookup("MYSQL_PWD");
        }
    }

    /// Returns a display-safe string (no password) for log messages.
    pub fn display_string(&self) -> String {
        let server = self.server.as_deref().unwrap_or(DEFAULT_SERVER);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        let database = self.database.as_deref().unwrap_or("(none)");
        format!("{database} @ {server}:{port}")
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mysqlcmd")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file is an empty config.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| MysqlCmdError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            MysqlCmdError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }

    /// Resolves the connection for an invocation.
    ///
    /// Precedence per field: `overrides` (CLI arguments), then the named
    /// profile (an unknown name is an error), then the `default` profile,
    /// then the environment.
    pub fn resolve_connection(
        &self,
        name: Option<&str>,
        overrides: &ConnectionConfig,
    ) -> Result<ConnectionConfig> {
        let mut connection = self.get_connection(None).cloned().unwrap_or_default();

        if let Some(name) = name {
            let profile = self.get_connection(Some(name)).ok_or_else(|| {
                MysqlCmdError::config(format!("Connection '{name}' not found in config file"))
            })?;
            connection.merge(profile);
        }

        connection.merge(overrides);
        connection.apply_env_defaults();

        Ok(connection)
    }
}
