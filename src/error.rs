//! Error types for mysqlcmd.
//!
//! Defines the main error enum used throughout the crate. Every variant
//! carries the underlying message verbatim so driver errors reach the caller
//! unchanged.

use thiserror::Error;

/// Main error type for mysqlcmd operations.
#[derive(Error, Debug)]
pub enum MysqlCmdError {
    /// Invalid invocation parameters (mutually exclusive or missing arguments).
    #[error("Invalid arguments: {0}")]
    ArgumentValidation(String),

    /// Database connection errors (host unreachable, auth failed, bad connection string).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, constraint violations, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// The command exceeded its configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The input file is missing or unreadable.
    #[error("File error: {0}")]
    FileAccess(String),

    /// Enlisting in or releasing an XA transaction failed.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Configuration errors (invalid config file, unknown profile, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MysqlCmdError {
    /// Creates an argument validation error with the given message.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::ArgumentValidation(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a timeout error with the given message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a file access error with the given message.
    pub fn file_access(msg: impl Into<String>) -> Self {
        Self::FileAccess(msg.into())
    }

    /// Creates a transaction error with the given message.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ArgumentValidation(_) => "Argument Error",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Timeout(_) => "Timeout Error",
            Self::FileAccess(_) => "File Error",
            Self::Transaction(_) => "Transaction Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using MysqlCmdError.
pub type Result<T> = std::result::Result<T, MysqlCmdError>;
