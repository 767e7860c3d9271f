//! Single-query execution.
//!
//! `QueryRunner::run` is the whole life of one invocation:
//!
//! ```text
//! validate -> connection string -> connect -> [XA START] -> read query
//!          -> execute per mode -> [XA END/PREPARE|ROLLBACK] -> close
//! ```
//!
//! The connection is closed on every path once it has been opened.

use crate::config::ConnectionConfig;
use crate::db::{Command, Connector, DatabaseClient, Record, Value};
use crate::error::{MysqlCmdError, Result};
use crate::transaction::{Enlistment, Xid};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Command timeout used when the caller does not pick one.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 30;

/// How the command is executed and what it returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Buffer every row.
    #[default]
    Rows,
    /// First column of the first row.
    Scalar,
    /// Affected-row count.
    NonQuery,
}

impl ExecutionMode {
    /// Picks the mode from the two switches. Scalar wins over non-query.
    pub fn from_flags(scalar: bool, non_query: bool) -> Self {
        if scalar {
            Self::Scalar
        } else if non_query {
            Self::NonQuery
        } else {
            Self::Rows
        }
    }
}

/// The result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Scalar(Value),
    NonQuery(u64),
    Rows(Vec<Record>),
}

/// Everything the caller supplies for one invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Inline SQL. Exclusive with `input_file`.
    pub query: Option<String>,

    /// File holding the SQL. Exclusive with `query`.
    pub input_file: Option<PathBuf>,

    /// Resolved connection parameters; username and password are required.
    pub connection: ConnectionConfig,

    /// Command timeout in seconds; 0 waits indefinitely.
    pub query_timeout: u32,

    pub mode: ExecutionMode,

    /// Enlist in the supplied transaction, if any.
    pub use_transaction: bool,
}

impl Invocation {
    /// Creates an inline-query invocation with default settings.
    pub fn inline(query: impl Into<String>, connection: ConnectionConfig) -> Self {
        Self {
            query: Some(query.into()),
            input_file: None,
            connection,
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            mode: ExecutionMode::default(),
            use_transaction: false,
        }
    }

    /// Creates an input-file invocation with default settings.
    pub fn from_file(path: impl Into<PathBuf>, connection: ConnectionConfig) -> Self {
        Self {
            query: None,
            input_file: Some(path.into()),
            ..Self::inline("", connection)
        }
    }

    /// Checks the parameters without touching the network or the filesystem.
    pub fn validate(&self) -> Result<()> {
        self.source()?;

        if is_blank(&self.connection.username) {
            return Err(MysqlCmdError::argument("A username is required."));
        }
        if is_blank(&self.connection.password) {
            return Err(MysqlCmdError::argument("A password is required."));
        }

        Ok(())
    }

    fn source(&self) -> Result<QuerySource<'_>> {
        let query = self.query.as_deref().filter(|q| !q.is_empty());
        let file = self
            .input_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty());

        match (query, file) {
            (Some(_), Some(_)) => Err(MysqlCmdError::argument(
                "Specify either a query or an input file, not both.",
            )),
            (None, None) => Err(MysqlCmdError::argument(
                "Specify a query or an input file containing the query to run.",
            )),
            (Some(sql), None) => Ok(QuerySource::Inline(sql)),
            (None, Some(path)) => Ok(QuerySource::File(path)),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Where the SQL text comes from.
enum QuerySource<'a> {
    Inline(&'a str),
    File(&'a Path),
}

impl QuerySource<'_> {
    async fn resolve(&self) -> Result<String> {
        match self {
            Self::Inline(sql) => Ok(sql.to_string()),
            Self::File(path) => {
                debug!("Using query in file {}", path.display());
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| MysqlCmdError::file_access(format!("{}: {e}", path.display())))?;
                // Invalid UTF-8 is replaced rather than rejected.
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

/// Runs invocations against connections from a `Connector`.
pub struct QueryRunner<'a> {
    connector: &'a dyn Connector,
}

impl<'a> QueryRunner<'a> {
    /// Creates a new query runner.
    pub fn new(connector: &'a dyn Connector) -> Self {
        Self { connector }
    }

    /// Runs one invocation, enlisting in `transaction` when the invocation
    /// opted in and a handle is given.
    pub async fn run(&self, invocation: &Invocation, transaction: Option<&Xid>) -> Result<QueryOutput> {
        invocation.validate()?;
        let source = invocation.source()?;
        debug!("Input validated.");

        let connection_string = invocation.connection.to_connection_string();
        debug!("Using the following connection string: {}", connection_string);
        let settings = connection_string.parse()?;

        let mut client = self.connector.connect(&settings).await?;
        debug!("Connection opened.");

        let outcome = run_in_scope(client.as_mut(), invocation, &source, transaction).await;

        if let Err(e) = client.close().await {
            warn!("Failed to close connection: {}", e);
        }
        debug!("Connection closed.");

        outcome
    }
}

async fn run_in_scope(
    client: &mut dyn DatabaseClient,
    invocation: &Invocation,
    source: &QuerySource<'_>,
    transaction: Option<&Xid>,
) -> Result<QueryOutput> {
    let enlistment = Enlistment::begin(
        client,
        invocation.use_transaction,
        transaction,
        invocation.query_timeout,
    )
    .await?;

    let outcome = execute(client, invocation, source).await;

    match enlistment {
        Some(enlistment) => enlistment.finish(client, outcome).await,
        None => outcome,
    }
}

async fn execute(
    client: &mut dyn DatabaseClient,
    invocation: &Invocation,
    source: &QuerySource<'_>,
) -> Result<QueryOutput> {
    let command = Command::new(source.resolve().await?, invocation.query_timeout);

    match invocation.mode {
        ExecutionMode::Scalar => {
            debug!("Running scalar query...");
            let value = client
                .query_scalar(&command)
                .await?
                .ok_or_else(|| MysqlCmdError::query("Scalar query returned no rows"))?;
            debug!("Query complete. Retrieved scalar result: {}", value);
            Ok(QueryOutput::Scalar(value))
        }
        ExecutionMode::NonQuery => {
            debug!("Running non-query command...");
            let affected = client.execute_non_query(&command).await?;
            debug!("Non-query complete. {} rows affected.", affected);
            Ok(QueryOutput::NonQuery(affected))
        }
        ExecutionMode::Rows => {
            debug!("Running query...");
            let rows = client.query_rows(&command).await?;
            debug!("Query complete. Returned {} rows.", rows.len());
            Ok(QueryOutput::Rows(rows))
        }
    }
}
