//! Connection string construction and parsing.
//!
//! The connection string is built by plain substitution into a fixed
//! `key=value;` template. Values are never quoted or escaped, so a value
//! containing `;` or `=` breaks the string. Parsing splits on those
//! characters the same naive way, which keeps that limitation visible.

use crate::error::{MysqlCmdError, Result};
use std::fmt;

/// Default MySQL server port.
pub const DEFAULT_PORT: u16 = 3306;

/// Server used when none is configured.
pub const DEFAULT_SERVER: &str = "localhost";

/// A `key=value;` connection string, as handed to the driver.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString(String);

impl ConnectionString {
    /// Builds the connection string from its parts. Values are inserted verbatim.
    pub fn build(
        server: &str,
        database: &str,
        username: &str,
        password: &str,
        port: u16,
    ) -> Self {
        let mut s = format!(
            "Data Source={server};Initial Catalog={database};User ID={username};Password={password}"
        );
        if port != DEFAULT_PORT {
            s.push_str(&format!(";Port={port}"));
        }
        Self(s)
    }

    /// Wraps an existing connection string without checking it.
    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the raw connection string, password included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the connection string with password values masked, for logging.
    ///
    /// A password may itself contain `;`, so everything after the password
    /// key is masked up to the next segment that starts with a known key.
    pub fn redacted(&self) -> String {
        let mut segments = Vec::new();
        let mut masking = false;

        for segment in self.0.split(';') {
            let key = segment.split_once('=').map(|(key, _)| key);
            match key {
                Some(key) if is_password_key(key) => {
                    segments.push(format!("{key}=*****"));
                    masking = true;
                }
                Some(key) if is_known_key(key) => {
                    segments.push(segment.to_string());
                    masking = false;
                }
                _ if masking => {}
                _ => segments.push(segment.to_string()),
            }
        }

        segments.join(";")
    }

    /// Parses the connection string into typed settings.
    pub fn parse(&self) -> Result<ConnectionSettings> {
        let mut settings = ConnectionSettings::default();

        for segment in self.0.split(';') {
            if segment.trim().is_empty() {
                continue;
            }

            let (key, value) = segment.split_once('=').ok_or_else(|| {
                MysqlCmdError::connection(format!(
                    "Format of the initialization string does not conform to specification near '{}'",
                    segment.trim()
                ))
            })?;
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "data source" | "server" | "host" => {
                    if !value.is_empty() {
                        settings.host = value.to_string();
                    }
                }
                "initial catalog" | "database" => {
                    settings.database = (!value.is_empty()).then(|| value.to_string());
                }
                "user id" | "uid" | "user" | "username" => settings.username = value.to_string(),
                "password" | "pwd" => settings.password = value.to_string(),
                "port" => {
                    settings.port = value.parse().map_err(|_| {
                        MysqlCmdError::connection(format!("Invalid port number '{value}'"))
                    })?;
                }
                other => {
                    return Err(MysqlCmdError::connection(format!(
                        "Option not supported: '{other}'"
                    )));
                }
            }
        }

        Ok(settings)
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionString")
            .field(&self.redacted())
            .finish()
    }
}

fn is_password_key(key: &str) -> bool {
    matches!(key.trim().to_lowercase().as_str(), "password" | "pwd")
}

fn is_known_key(key: &str) -> bool {
    matches!(
        key.trim().to_lowercase().as_str(),
        "data source"
            | "server"
            | "host"
            | "initial catalog"
            | "database"
            | "user id"
            | "uid"
            | "user"
            | "username"
            | "password"
            | "pwd"
            | "port"
    )
}

/// Typed connection settings parsed from a [`ConnectionString`].
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub username: String,
    pub password: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            database: None,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ConnectionSettings {
    /// Returns a display-safe string (no password) for log messages.
    pub fn display_string(&self) -> String {
        let database = self.database.as_deref().unwrap_or("(none)");
        format!("{}@{}:{} / {}", self.username, self.host, self.port, database)
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}
