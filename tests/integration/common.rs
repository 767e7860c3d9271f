//! Shared helpers for the integration tests.

use mysqlcmd::config::ConnectionConfig;
use mysqlcmd::db::{ConnectionSettings, ConnectionString};

/// Helper to get the test connection settings from the environment.
pub fn test_settings() -> Option<ConnectionSettings> {
    let raw = std::env::var("MYSQLCMD_TEST_CONNECTION").ok()?;
    ConnectionString::from_raw(raw).parse().ok()
}

/// The test connection as invocation parameters.
pub fn test_connection() -> Option<ConnectionConfig> {
    let settings = test_settings()?;
    Some(ConnectionConfig {
        server: Some(settings.host),
        port: Some(settings.port),
        database: settings.database,
        username: Some(settings.username),
        password: Some(settings.password),
    })
}

/// A name unique to this test run, for tables and transaction ids.
pub fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}_{}_{nanos}", std::process::id())
}
