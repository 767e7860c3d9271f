//! Enlistment in an externally owned XA transaction.
//!
//! The caller owns the global transaction: it picks the XID and later issues
//! `XA COMMIT` or `XA ROLLBACK`. An invocation only runs its own branch:
//!
//! ```text
//! XA START xid ; <command> ; XA END xid ; XA PREPARE xid
//! ```
//!
//! Preparing leaves the branch durable after the connection closes so the
//! owner can finish it from any session. When the command fails the branch is
//! rolled back instead.

use crate::db::{Command, DatabaseClient};
use crate::error::{MysqlCmdError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Longest gtrid or bqual MySQL accepts, in bytes.
const MAX_XID_PART_LEN: usize = 64;

/// formatID used when the handle does not carry one.
const DEFAULT_FORMAT_ID: u32 = 1;

/// An XA transaction identifier: `gtrid[,bqual[,formatID]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xid {
    gtrid: Vec<u8>,
    bqual: Vec<u8>,
    format_id: u32,
}

impl Xid {
    /// Creates an identifier from its parts.
    pub fn new(gtrid: impl Into<Vec<u8>>, bqual: impl Into<Vec<u8>>, format_id: u32) -> Result<Self> {
        let gtrid = gtrid.into();
        let bqual = bqual.into();

        if gtrid.is_empty() {
            return Err(MysqlCmdError::argument(
                "Transaction id must have a non-empty gtrid",
            ));
        }
        if gtrid.len() > MAX_XID_PART_LEN || bqual.len() > MAX_XID_PART_LEN {
            return Err(MysqlCmdError::argument(format!(
                "Transaction id parts are limited to {MAX_XID_PART_LEN} bytes"
            )));
        }

        Ok(Self {
            gtrid,
            bqual,
            format_id,
        })
    }

    /// Renders the identifier as SQL. Parts are hex literals so no quoting is
    /// needed whatever bytes they hold.
    pub fn to_sql(&self) -> String {
        format!(
            "X'{}',X'{}',{}",
            hex(&self.gtrid),
            hex(&self.bqual),
            self.format_id
        )
    }
}

impl FromStr for Xid {
    type Err = MysqlCmdError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ',');
        let gtrid = parts.next().unwrap_or_default().trim();
        let bqual = parts.next().unwrap_or_default().trim();
        let format_id = match parts.next().map(str::trim) {
            Some(raw) => raw.parse().map_err(|_| {
                MysqlCmdError::argument(format!("Invalid transaction formatID '{raw}'"))
            })?,
            None => DEFAULT_FORMAT_ID,
        };

        Self::new(gtrid, bqual, format_id)
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            String::from_utf8_lossy(&self.gtrid),
            String::from_utf8_lossy(&self.bqual),
            self.format_id
        )
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// An active enlistment of one connection in an XA transaction.
///
/// Obtained from [`Enlistment::begin`], which returns `None` when there is
/// nothing to enlist in. It must be finished with [`Enlistment::finish`] on
/// the same connection before the connection is closed.
#[derive(Debug)]
#[must_use = "an enlistment must be finished before the connection closes"]
pub struct Enlistment {
    xid: Xid,
    timeout_secs: u32,
}

impl Enlistment {
    /// Starts the branch when the caller opted in and supplied a handle.
    pub async fn begin(
        client: &mut dyn DatabaseClient,
        use_transaction: bool,
        xid: Option<&Xid>,
        timeout_secs: u32,
    ) -> Result<Option<Self>> {
        let xid = match (use_transaction, xid) {
            (true, Some(xid)) => xid.clone(),
            (true, None) => {
                debug!("No transaction supplied; running without enlistment.");
                return Ok(None);
            }
            (false, _) => return Ok(None),
        };

        let enlistment = Self { xid, timeout_secs };
        enlistment.run(client, "START").await?;
        debug!("Enlisted in transaction {}.", enlistment.xid);

        Ok(Some(enlistment))
    }

    /// Ends the branch. A successful outcome prepares the branch; a failed one
    /// rolls it back and returns the original error untouched. After a timeout
    /// nothing more is sent on the connection.
    pub async fn finish<T>(self, client: &mut dyn DatabaseClient, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.run(client, "END").await?;
                self.run(client, "PREPARE").await?;
                debug!("Transaction branch {} prepared.", self.xid);
                Ok(value)
            }
            Err(e @ MysqlCmdError::Timeout(_)) => {
                // The connection still owes the abandoned result; MySQL rolls
                // the active branch back once it is dropped.
                debug!("Leaving branch {} to the server after timeout.", self.xid);
                Err(e)
            }
            Err(e) => {
                for action in ["END", "ROLLBACK"] {
                    if let Err(release) = self.run(client, action).await {
                        warn!("XA {} {} failed: {}", action, self.xid, release);
                        break;
                    }
                }
                Err(e)
            }
        }
    }

    async fn run(&self, client: &mut dyn DatabaseClient, action: &str) -> Result<()> {
        let command = Command::new(format!("XA {action} {}", self.xid.to_sql()), self.timeout_secs);
        client
            .execute_non_query(&command)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                MysqlCmdError::Query(message) => MysqlCmdError::Transaction(message),
                other => other,
            })
    }
}
