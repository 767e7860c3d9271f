//! Integration tests for mysqlcmd.
//!
//! These tests require a running MySQL server.
//! Set MYSQLCMD_TEST_CONNECTION to run them.

pub mod common;
pub mod connection_test;
pub mod query_test;
pub mod transaction_test;
