//! Database abstraction layer for mysqlcmd.
//!
//! Provides a trait-based interface for the handful of driver operations the
//! query runner needs, so the MySQL driver and the in-memory mock can be used
//! interchangeably.

mod connection_string;
mod mock;
mod mysql;
mod types;

pub use connection_string::{ConnectionSettings, ConnectionString, DEFAULT_PORT, DEFAULT_SERVER};
pub use mock::{MockDatabase, MockResponse};
pub use mysql::{MySqlClient, MySqlConnector};
pub use types::{Record, Value};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// SQL text bound to an execution timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// SQL to send. May contain several `;`-separated statements.
    pub text: String,

    /// Execution limit; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Command {
    /// Creates a command. A timeout of zero seconds means no limit.
    pub fn new(text: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            text: text.into(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs.into())),
        }
    }
}

/// Opens connections. One call per invocation; there is no pool.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new connection with the given settings.
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn DatabaseClient>>;
}

/// A single open database connection.
///
/// All operations are async and return Results with MysqlCmdError.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes the command and returns the first column of the first row,
    /// or `None` when the command produced no rows.
    async fn query_scalar(&mut self, command: &Command) -> Result<Option<Value>>;

    /// Executes the command for its side effects and returns the number of
    /// affected rows.
    async fn execute_non_query(&mut self, command: &Command) -> Result<u64>;

    /// Executes the command and buffers every returned row.
    async fn query_rows(&mut self, command: &Command) -> Result<Vec<Record>>;

    /// Closes the connection. Further calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}
