//! Command-line argument parsing for mysqlcmd.

use crate::config::{Config, ConnectionConfig};
use crate::error::Result;
use crate::output::OutputFormat;
use crate::query::{ExecutionMode, Invocation, DEFAULT_QUERY_TIMEOUT_SECS};
use crate::transaction::Xid;
use clap::Parser;
use std::path::PathBuf;

/// Run a SQL query against a MySQL server and print the result.
#[derive(Parser, Debug)]
#[command(name = "mysqlcmd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL to run
    #[arg(short = 'Q', long, value_name = "SQL")]
    pub query: Option<String>,

    /// File containing the SQL to run
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Login name
    #[arg(short = 'u', long, value_name = "USER")]
    pub username: Option<String>,

    /// Login password
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Server host [default: localhost]
    #[arg(short = 'S', long, value_name = "HOST")]
    pub server: Option<String>,

    /// Default database
    #[arg(short = 'd', long, value_name = "DATABASE")]
    pub database: Option<String>,

    /// Server port [default: 3306]
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Command timeout in seconds (0 waits indefinitely)
    #[arg(short = 't', long, value_name = "SECONDS", default_value_t = DEFAULT_QUERY_TIMEOUT_SECS)]
    pub query_timeout: u32,

    /// Return only the first column of the first row
    #[arg(long)]
    pub scalar: bool,

    /// Run for side effects and return the number of affected rows
    #[arg(long)]
    pub non_query: bool,

    /// Enlist in the transaction given by --transaction, if any
    #[arg(long)]
    pub use_transaction: bool,

    /// XA transaction id to enlist in (gtrid[,bqual[,formatID]])
    #[arg(long, value_name = "XID", env = "MYSQLCMD_TRANSACTION")]
    pub transaction: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short = 'o', long, value_name = "FORMAT", default_value = "text")]
    pub output: OutputFormat,

    /// Log each execution phase to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Connection fields given on the command line.
    pub fn connection_overrides(&self) -> ConnectionConfig {
        ConnectionConfig {
            server: self.server.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Builds the invocation, resolving connection fields against `config`
    /// and the environment.
    pub fn to_invocation(&self, config: &Config) -> Result<Invocation> {
        let connection =
            config.resolve_connection(self.connection_name(), &self.connection_overrides())?;

        Ok(Invocation {
            query: self.query.clone(),
            input_file: self.input_file.clone(),
            connection,
            query_timeout: self.query_timeout,
            mode: ExecutionMode::from_flags(self.scalar, self.non_query),
            use_transaction: self.use_transaction,
        })
    }

    /// Parses the --transaction handle, if given.
    pub fn transaction(&self) -> Result<Option<Xid>> {
        self.transaction
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}
