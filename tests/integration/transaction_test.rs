//! XA enlistment integration tests.
//!
//! The test plays the transaction owner: it picks the XID, lets an
//! invocation enlist, then finishes the prepared branch itself.

use super::common::{test_connection, test_settings, unique_name};
use mysqlcmd::db::{Command, DatabaseClient, MySqlClient, MySqlConnector, Value};
use mysqlcmd::query::{ExecutionMode, Invocation, QueryOutput, QueryRunner};
use mysqlcmd::transaction::Xid;

async fn owner_client() -> Option<MySqlClient> {
    MySqlClient::connect(&test_settings()?).await.ok()
}

async fn count(client: &mut MySqlClient, table: &str) -> Value {
    client
        .query_scalar(&Command::new(format!("SELECT COUNT(*) FROM {table}"), 30))
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_enlisted_insert_is_prepared_for_owner() {
    let (Some(connection), Some(mut owner)) = (test_connection(), owner_client().await) else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let table = unique_name("mysqlcmd_xa");
    owner
        .execute_non_query(&Command::new(format!("CREATE TABLE {table} (id INT)"), 30))
        .await
        .unwrap();

    let xid: Xid = unique_name("tx").parse().unwrap();
    let mut invocation = Invocation::inline(format!("INSERT INTO {table} VALUES (1)"), connection);
    invocation.mode = ExecutionMode::NonQuery;
    invocation.use_transaction = true;

    let output = QueryRunner::new(&MySqlConnector)
        .run(&invocation, Some(&xid))
        .await
        .unwrap();
    assert_eq!(output, QueryOutput::NonQuery(1));

    // Prepared but not committed: invisible until the owner commits.
    assert_eq!(count(&mut owner, &table).await, Value::Int(0));

    owner
        .execute_non_query(&Command::new(format!("XA COMMIT {}", xid.to_sql()), 30))
        .await
        .unwrap();
    assert_eq!(count(&mut owner, &table).await, Value::Int(1));

    owner
        .execute_non_query(&Command::new(format!("DROP TABLE {table}"), 30))
        .await
        .unwrap();
    owner.close().await.unwrap();
}

#[tokio::test]
async fn test_use_transaction_without_handle_autocommits() {
    let (Some(connection), Some(mut owner)) = (test_connection(), owner_client().await) else {
        eprintln!("Skipping test: MYSQLCMD_TEST_CONNECTION not set");
        return;
    };

    let table = unique_name("mysqlcmd_noxa");
    owner
        .execute_non_query(&Command::new(format!("CREATE TABLE {table} (id INT)"), 30))
        .await
        .unwrap();

    let mut invocation = Invocation::inline(format!("INSERT INTO {table} VALUES (1)"), connection);
    invocation.mode = ExecutionMode::NonQuery;
    invocation.use_transaction = true;

    QueryRunner::new(&MySqlConnector)
        .run(&invocation, None)
        .await
        .unwrap();
    assert_eq!(count(&mut owner, &table).await, Value::Int(1));

    owner
        .execute_non_query(&Command::new(format!("DROP TABLE {table}"), 30))
        .await
        .unwrap();
    owner.close().await.unwrap();
}
