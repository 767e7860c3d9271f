//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient`
//! trait over a single sqlx `MySqlConnection`. Commands are sent with
//! `sqlx::raw_sql`, i.e. over the text protocol, so a command may hold
//! several `;`-separated statements.

use crate::db::{
    Command, ConnectionSettings, Connector, DatabaseClient, Record, Value,
};
use crate::error::{MysqlCmdError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, TypeInfo, ValueRef,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Opens real MySQL connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn DatabaseClient>> {
        let client = MySqlClient::connect(settings).await?;
        Ok(Box::new(client))
    }
}

/// MySQL database client owning exactly one connection.
#[derive(Debug)]
pub struct MySqlClient {
    conn: Option<MySqlConnection>,
    /// Set when a command was abandoned mid-flight; the connection state is
    /// then unknown and it must not be closed gracefully.
    broken: bool,
}

impl MySqlClient {
    /// Opens a connection with the given settings.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.username)
            .password(&settings.password);

        if let Some(database) = &settings.database {
            options = options.database(database);
        }

        // Statements are traced by the runner at debug level.
        let options = options.disable_statement_logging();

        debug!("Connecting to {}", settings.display_string());

        let conn = tokio::time::timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            options.connect(),
        )
        .await
        .map_err(|_| {
            MysqlCmdError::connection(format!(
                "Connection to {}:{} timed out after {CONNECT_TIMEOUT_SECS} seconds",
                settings.host, settings.port
            ))
        })?
        .map_err(|e| MysqlCmdError::connection(e.to_string()))?;

        Ok(Self {
            conn: Some(conn),
            broken: false,
        })
    }

    fn conn(&mut self) -> Result<&mut MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| MysqlCmdError::connection("Connection is closed"))
    }

    fn note_outcome<T>(&mut self, result: &Result<T>) {
        if matches!(result, Err(MysqlCmdError::Timeout(_))) {
            self.broken = true;
        }
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn query_scalar(&mut self, command: &Command) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let result = bounded(
            command.timeout,
            Executor::fetch_optional(conn, sqlx::raw_sql(&command.text)),
        )
        .await;
        self.note_outcome(&result);

        Ok(result?.map(|row| {
            row.columns()
                .first()
                .map(|col| convert_value(&row, 0, col.type_info().name()))
                .unwrap_or(Value::Null)
        }))
    }

    async fn execute_non_query(&mut self, command: &Command) -> Result<u64> {
        let conn = self.conn()?;
        let result = bounded(
            command.timeout,
            Executor::execute(conn, sqlx::raw_sql(&command.text)),
        )
        .await;
        self.note_outcome(&result);

        Ok(result?.rows_affected())
    }

    async fn query_rows(&mut self, command: &Command) -> Result<Vec<Record>> {
        let conn = self.conn()?;
        let result = bounded(
            command.timeout,
            Executor::fetch_all(conn, sqlx::raw_sql(&command.text)),
        )
        .await;
        self.note_outcome(&result);

        Ok(convert_rows(&result?))
    }

    async fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        let result = if self.broken {
            warn!("Dropping connection after an abandoned command");
            conn.close_hard().await
        } else {
            conn.close().await
        };

        result.map_err(|e| MysqlCmdError::connection(e.to_string()))
    }
}

/// Awaits a driver future, bounded by the command timeout.
async fn bounded<T, F>(timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            MysqlCmdError::timeout(format!(
                "Command timed out after {} seconds",
                limit.as_secs()
            ))
        })?,
        None => fut.await,
    };

    result.map_err(|e| MysqlCmdError::query(format_query_error(e)))
}

/// Converts sqlx rows to records. Rows from consecutive statements may carry
/// different column lists; records share a list while it stays the same.
fn convert_rows(rows: &[MySqlRow]) -> Vec<Record> {
    let mut columns: Arc<[String]> = Arc::from(Vec::new());
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let same_columns = row.columns().len() == columns.len()
            && row
                .columns()
                .iter()
                .zip(columns.iter())
                .all(|(col, name)| col.name() == name);

        if !same_columns {
            columns = row.columns().iter().map(|col| col.name().to_string()).collect();
        }

        records.push(Record::new(columns.clone(), convert_row(row)));
    }

    records
}

/// Converts a sqlx MySqlRow to its values in column order.
fn convert_row(row: &MySqlRow) -> Vec<Value> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
///
/// Values are decoded unchecked: over the text protocol every value is sent
/// as text and the numeric decoders parse it.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let is_null = row
        .try_get_raw(index)
        .map(|raw| raw.is_null())
        .unwrap_or(true);
    if is_null {
        return Value::Null;
    }

    let typed = match type_name {
        "BOOLEAN" => decode::<bool>(row, index).map(Value::Bool),

        name if name.ends_with("UNSIGNED") => decode::<u64>(row, index).map(Value::UInt),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            decode::<i64>(row, index).map(Value::Int)
        }

        "FLOAT" | "DOUBLE" => decode::<f64>(row, index).map(Value::Float),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => decode::<Vec<u8>>(row, index).map(Value::Bytes),

        // DECIMAL, temporal types, JSON, ENUM, SET and character types
        _ => None,
    };

    typed.unwrap_or_else(|| text_or_bytes(row, index))
}

fn text_or_bytes(row: &MySqlRow, index: usize) -> Value {
    decode::<String>(row, index)
        .map(Value::String)
        .or_else(|| decode::<Vec<u8>>(row, index).map(Value::Bytes))
        .unwrap_or(Value::Null)
}

fn decode<'r, T>(row: &'r MySqlRow, index: usize) -> Option<T>
where
    T: sqlx::Decode<'r, MySql>,
{
    row.try_get_unchecked::<Option<T>, _>(index).ok().flatten()
}

/// Formats a driver error the way the mysql client prints server errors.
fn format_query_error(error: sqlx::Error) -> String {
    if let Some(db_error) = error.as_database_error() {
        if let Some(mysql_error) = db_error.try_downcast_ref::<MySqlDatabaseError>() {
            return match mysql_error.code() {
                Some(state) => format!(
                    "ERROR {} ({}): {}",
                    mysql_error.number(),
                    state,
                    mysql_error.message()
                ),
                None => format!("ERROR {}: {}", mysql_error.number(), mysql_error.message()),
            };
        }
        return db_error.message().to_string();
    }

    error.to_string()
}
