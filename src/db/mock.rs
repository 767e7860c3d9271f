//! Mock database for testing.
//!
//! Provides an in-memory `Connector` whose connections answer from a table of
//! scripted responses and record every call, so runner behaviour can be
//! checked without a server.

use super::{Command, ConnectionSettings, Connector, DatabaseClient, Record, Value};
use crate::error::{MysqlCmdError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A scripted answer for one SQL text.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Rows returned to scalar and row-set commands; non-query gets 0.
    Rows(Vec<Record>),
    /// Affected-row count for non-query commands; readers get no rows.
    Affected(u64),
    /// The command fails with this driver message.
    Error(String),
    /// The command exceeds its timeout.
    Timeout,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    connect_error: Option<String>,
    connections: Vec<ConnectionSettings>,
    log: Vec<String>,
}

/// A mock database shared between the test and the connections it hands out.
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    state: Arc<Mutex<MockState>>,
}

impl MockDatabase {
    /// Creates a mock database with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for an exact SQL text. Unscripted SQL succeeds
    /// with no rows and no affected rows.
    pub fn respond(self, sql: impl Into<String>, response: MockResponse) -> Self {
        self.lock().responses.insert(sql.into(), response);
        self
    }

    /// Makes every connection attempt fail with the given message.
    pub fn refuse_connections(self, message: impl Into<String>) -> Self {
        self.lock().connect_error = Some(message.into());
        self
    }

    /// Settings of every connection attempt, in order.
    pub fn connections(&self) -> Vec<ConnectionSettings> {
        self.lock().connections.clone()
    }

    /// Every call made on connections from this database, in order.
    ///
    /// Entries look like `scalar: SELECT 1`, `non_query: ...`, `rows: ...`
    /// and `close`.
    pub fn log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the log from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Connector for MockDatabase {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn DatabaseClient>> {
        let mut state = self.lock();
        state.connections.push(settings.clone());
        if let Some(message) = &state.connect_error {
            return Err(MysqlCmdError::connection(message.clone()));
        }
        drop(state);

        Ok(Box::new(MockClient {
            db: self.clone(),
            closed: false,
        }))
    }
}

struct MockClient {
    db: MockDatabase,
    closed: bool,
}

impl MockClient {
    fn answer(&self, kind: &str, command: &Command) -> Result<MockResponse> {
        let mut state = self.db.lock();
        state.log.push(format!("{kind}: {}", command.text));

        if self.closed {
            return Err(MysqlCmdError::connection("Connection is closed"));
        }

        match state.responses.get(&command.text).cloned() {
            Some(MockResponse::Error(message)) => Err(MysqlCmdError::query(message)),
            Some(MockResponse::Timeout) => Err(MysqlCmdError::timeout(format!(
                "Command timed out after {} seconds",
                command.timeout.map(|t| t.as_secs()).unwrap_or_default()
            ))),
            Some(response) => Ok(response),
            None => Ok(MockResponse::Affected(0)),
        }
    }
}

#[async_trait]
impl DatabaseClient for MockClient {
    async fn query_scalar(&mut self, command: &Command) -> Result<Option<Value>> {
        Ok(match self.answer("scalar", command)? {
            MockResponse::Rows(rows) => rows
                .first()
                .map(|row| row.values().first().cloned().unwrap_or_default()),
            _ => None,
        })
    }

    async fn execute_non_query(&mut self, command: &Command) -> Result<u64> {
        Ok(match self.answer("non_query", command)? {
            MockResponse::Affected(count) => count,
            _ => 0,
        })
    }

    async fn query_rows(&mut self, command: &Command) -> Result<Vec<Record>> {
        Ok(match self.answer("rows", command)? {
            MockResponse::Rows(rows) => rows,
            _ => Vec::new(),
        })
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.db.lock().log.push("close".to_string());
        }
        Ok(())
    }
}
