//! Connection integration tests.
//!
//! Tests database connectivity and error handling.

use super::common::{test_connection, test_settings};
use mysqlcmd::config::ConnectionConfig;
use mysqlcmd::db::{DatabaseClient, MySqlClient, MySqlConnector};
use mysqlcmd::error::MysqlCmdError;
use mysqlcmd::query::{Invocation, QueryRunner};

#[tokio::test]
async fn test_connect_with_valid_credentials() {
    let Some(settings) = test_settings() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let mut client = MySqlClient::connect(&settings).await.unwrap();

    // Connection succeeded if we got here
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_connect_with_wrong_password() {
    let Some(mut connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };
    connection.password = Some("definitely-not-the-password".to_string());

    let err = QueryRunner::new(&MySqlConnector)
        .run(&Invocation::inline("SELECT 1", connection), None)
        .await
        .unwrap_err();

    assert!(matches!(err, MysqlCmdError::Connection(_)));
    assert!(
        err.to_string().contains("Access denied"),
        "Expected the server's message, got: {err}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_host() {
    let connection = ConnectionConfig {
        server: Some("invalid.host.that.does.not.exist.local".to_string()),
        username: Some("app".to_string()),
        password: Some("pw".to_string()),
        ..Default::default()
    };

    let err = QueryRunner::new(&MySqlConnector)
        .run(&Invocation::inline("SELECT 1", connection), None)
        .await
        .unwrap_err();

    assert!(matches!(err, MysqlCmdError::Connection(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_closed_port() {
    let connection = ConnectionConfig {
        server: Some("127.0.0.1".to_string()),
        port: Some(1),
        username: Some("app".to_string()),
        password: Some("pw".to_string()),
        ..Default::default()
    };

    let err = QueryRunner::new(&MySqlConnector)
        .run(&Invocation::inline("SELECT 1", connection), None)
        .await
        .unwrap_err();

    assert!(matches!(err, MysqlCmdError::Connection(_)));
}
