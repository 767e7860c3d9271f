//! Query execution integration tests.
//!
//! Tests the three execution modes against a real server. Each invocation
//! opens its own connection, so temporary tables only live within one
//! multi-statement command.

use super::common::test_connection;
use mysqlcmd::db::{MySqlConnector, Value};
use mysqlcmd::error::MysqlCmdError;
use mysqlcmd::query::{ExecutionMode, Invocation, QueryOutput, QueryRunner};

const SEED: &str = "CREATE TEMPORARY TABLE t (id INT PRIMARY KEY, name VARCHAR(20), x INT); \
                    INSERT INTO t VALUES (5, 'Alice', 0), (6, 'Bob', 0);";

#[tokio::test]
async fn test_scalar_select_one() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let mut invocation = Invocation::inline("SELECT 1", connection);
    invocation.mode = ExecutionMode::Scalar;

    let output = QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap();

    assert_eq!(output, QueryOutput::Scalar(Value::Int(1)));
}

#[tokio::test]
async fn test_scalar_without_rows_fails() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let mut invocation = Invocation::inline("SELECT 1 FROM DUAL WHERE 1 = 0", connection);
    invocation.mode = ExecutionMode::Scalar;

    let err = QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MysqlCmdError::Query(_)));
}

#[tokio::test]
async fn test_non_query_counts_affected_rows() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    // 2 inserted + 1 updated
    let sql = format!("{SEED} UPDATE t SET x = 1 WHERE id = 5");
    let mut invocation = Invocation::inline(sql, connection.clone());
    invocation.mode = ExecutionMode::NonQuery;

    let output = QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap();
    assert_eq!(output, QueryOutput::NonQuery(3));

    let sql = format!("{SEED} UPDATE t SET x = 1 WHERE id = 99");
    let mut invocation = Invocation::inline(sql, connection);
    invocation.mode = ExecutionMode::NonQuery;

    let output = QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap();
    assert_eq!(output, QueryOutput::NonQuery(2));
}

#[tokio::test]
async fn test_rows_match_table_contents() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let sql = format!("{SEED} SELECT id, name FROM t ORDER BY id");
    let invocation = Invocation::inline(sql, connection);
    let runner = QueryRunner::new(&MySqlConnector);

    let output = runner.run(&invocation, None).await.unwrap();
    let QueryOutput::Rows(records) = &output else {
        panic!("expected rows, got {output:?}");
    };

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].columns(), ["id", "name"]);
    assert_eq!(records[0].get("id"), Some(&Value::Int(5)));
    assert_eq!(records[1].get("name"), Some(&Value::from("Bob")));

    // Same read, same answer.
    assert_eq!(runner.run(&invocation, None).await.unwrap(), output);
}

#[tokio::test]
async fn test_query_from_file() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.sql");
    std::fs::write(&path, format!("{SEED}\nSELECT COUNT(*) AS n FROM t;\n")).unwrap();

    let mut invocation = Invocation::from_file(&path, connection);
    invocation.mode = ExecutionMode::Scalar;

    let output = QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap();
    assert_eq!(output, QueryOutput::Scalar(Value::Int(2)));
}

#[tokio::test]
async fn test_syntax_error_carries_server_message() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let err = QueryRunner::new(&MySqlConnector)
        .run(&Invocation::inline("SELEC 1", connection), None)
        .await
        .unwrap_err();

    assert!(matches!(err, MysqlCmdError::Query(_)));
    assert!(err.to_string().contains("1064"), "got: {err}");
}

#[tokio::test]
async fn test_timeout() {
    let Some(connection) = test_connection() else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let mut invocation = Invocation::inline("SELECT SLEEP(5)", connection);
    invocation.query_timeout = 1;

    let err = QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MysqlCmdError::Timeout(_)));
}
