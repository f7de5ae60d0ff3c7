//! Per-target fetch primitives
//!
//! One metadata statement per (target, kind) pair. Each primitive returns an
//! explicit `Result` and never panics or propagates past the fetch boundary;
//! callers record failures and keep going.

use snowsurvey_client::{ClientError, WarehouseClient};
use snowsurvey_core::ident::quote_table;
use snowsurvey_core::{quote_ident, Grid, ObjectRef, ParameterScope, TableRef};

/// How a single target fetch failed
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchFailure {
    /// The statement itself failed
    #[error("{0}")]
    Query(#[from] ClientError),

    /// The statement succeeded but returned zero rows where rows were
    /// required (e.g. warehouse parameters after a resume attempt)
    #[error("no parameter data returned")]
    EmptyResult,

    /// The result did not have the expected shape
    #[error("malformed result: {0}")]
    Malformed(String),
}

/// Fetch parameters for one scope.
///
/// For warehouse scopes a suspended warehouse is first resumed best-effort,
/// and a zero-row result is reported as [`FetchFailure::EmptyResult`] rather
/// than success: a reachable warehouse always has parameters, so an empty
/// grid means the fetch silently did not happen.
pub async fn fetch_parameters(
    client: &dyn WarehouseClient,
    scope: &ParameterScope,
) -> Result<Grid, FetchFailure> {
    let sql = match scope {
        ParameterScope::Account => "SHOW PARAMETERS IN ACCOUNT".to_string(),
        ParameterScope::Session => "SHOW PARAMETERS IN SESSION".to_string(),
        ParameterScope::Database(name) => {
            format!("SHOW PARAMETERS IN DATABASE {}", quote_ident(name))
        }
        ParameterScope::Warehouse(name) => {
            resume_warehouse(client, name).await;
            format!("SHOW PARAMETERS IN WAREHOUSE {}", quote_ident(name))
        }
    };

    let grid = client.execute(&sql).await?;

    if matches!(scope, ParameterScope::Warehouse(_)) && grid.is_empty() {
        return Err(FetchFailure::EmptyResult);
    }
    Ok(grid)
}

/// Attempt to resume a suspended warehouse.
///
/// Best-effort: a failure (already running, no privilege, nonexistent) must
/// not block the parameter fetch that follows, so it is logged and dropped.
pub async fn resume_warehouse(client: &dyn WarehouseClient, name: &str) {
    let sql = format!("ALTER WAREHOUSE {} RESUME", quote_ident(name));
    if let Err(error) = client.execute(&sql).await {
        tracing::debug!(warehouse = name, %error, "warehouse resume failed, continuing");
    }
}

/// Fetch the column definition rows of one table (`DESCRIBE TABLE`).
pub async fn describe_table(
    client: &dyn WarehouseClient,
    table: &TableRef,
) -> Result<Grid, FetchFailure> {
    let sql = format!("DESCRIBE TABLE {}", quote_table(table));
    Ok(client.execute(&sql).await?)
}

/// Fetch up to `limit` raw sample rows of one table.
pub async fn sample_rows(
    client: &dyn WarehouseClient,
    table: &TableRef,
    limit: usize,
) -> Result<Grid, FetchFailure> {
    let sql = format!("SELECT * FROM {} LIMIT {}", quote_table(table), limit);
    // The statement already carries LIMIT; truncation covers servers that
    // ignore it on metadata-only responses.
    Ok(client.execute(&sql).await?.truncated(limit))
}

/// Fetch grant assignments on one object (`SHOW GRANTS ON …`).
pub async fn fetch_grants(
    client: &dyn WarehouseClient,
    object: &ObjectRef,
) -> Result<Grid, FetchFailure> {
    let quoted = match object {
        ObjectRef::Database(name) => quote_ident(name),
        ObjectRef::Schema { database, name } => {
            format!("{}.{}", quote_ident(database), quote_ident(name))
        }
        ObjectRef::Table(table) => quote_table(table),
    };
    let sql = format!("SHOW GRANTS ON {} {}", object.kind(), quoted);
    Ok(client.execute(&sql).await?)
}

/// Enumerate base tables of one database through its information schema.
///
/// Returns `(schema, table)` pairs. One statement per database keeps the
/// crawl linear in the number of databases rather than schemas.
pub async fn list_base_tables(
    client: &dyn WarehouseClient,
    database: &str,
) -> Result<Vec<(String, String)>, FetchFailure> {
    let sql = format!(
        "SELECT table_schema, table_name FROM {}.information_schema.tables \
         WHERE table_type = 'BASE TABLE' ORDER BY table_schema, table_name",
        quote_ident(database)
    );
    let grid = client.execute(&sql).await?;

    let mut pairs = Vec::with_capacity(grid.row_count());
    for row in &grid.rows {
        match (row.first().cloned().flatten(), row.get(1).cloned().flatten()) {
            (Some(schema), Some(table)) => pairs.push((schema, table)),
            _ => {
                return Err(FetchFailure::Malformed(
                    "information_schema.tables row missing schema or table name".to_string(),
                ))
            }
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowsurvey_client::MockClient;

    fn grid(columns: &[&str], rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Some(v.to_string())).collect())
                .collect(),
        )
    }

    #[tokio::test]
    async fn account_parameters_statement() {
        let client = MockClient::new();
        client
            .add_response(
                "SHOW PARAMETERS IN ACCOUNT",
                grid(&["key", "value"], &[&["TIMEZONE", "UTC"]]),
            )
            .await;

        let result = fetch_parameters(&client, &ParameterScope::Account)
            .await
            .unwrap();
        assert_eq!(result.row_count(), 1);
    }

    #[tokio::test]
    async fn database_scope_quotes_the_name() {
        let client = MockClient::new();
        client
            .add_response(
                "SHOW PARAMETERS IN DATABASE \"MY\"\"DB\"",
                grid(&["key", "value"], &[]),
            )
            .await;

        let scope = ParameterScope::Database("MY\"DB".to_string());
        assert!(fetch_parameters(&client, &scope).await.is_ok());
    }

    #[tokio::test]
    async fn warehouse_fetch_attempts_resume_first() {
        let client = MockClient::new();
        client
            .add_response(
                "SHOW PARAMETERS IN WAREHOUSE \"WH1\"",
                grid(&["key", "value"], &[&["STATEMENT_TIMEOUT_IN_SECONDS", "0"]]),
            )
            .await;
        // No scripted response for the resume: it fails and is swallowed.

        let scope = ParameterScope::Warehouse("WH1".to_string());
        assert!(fetch_parameters(&client, &scope).await.is_ok());
        assert!(client.was_executed("ALTER WAREHOUSE \"WH1\" RESUME").await);
    }

    #[tokio::test]
    async fn empty_warehouse_parameters_are_a_failure() {
        let client = MockClient::new();
        client
            .add_response("ALTER WAREHOUSE \"WH1\" RESUME", grid(&["status"], &[]))
            .await;
        client
            .add_response(
                "SHOW PARAMETERS IN WAREHOUSE \"WH1\"",
                grid(&["key", "value"], &[]),
            )
            .await;

        let scope = ParameterScope::Warehouse("WH1".to_string());
        let result = fetch_parameters(&client, &scope).await;
        assert!(matches!(result, Err(FetchFailure::EmptyResult)));
    }

    #[tokio::test]
    async fn empty_database_parameters_are_not_a_failure() {
        let client = MockClient::new();
        client
            .add_response(
                "SHOW PARAMETERS IN DATABASE \"DB1\"",
                grid(&["key", "value"], &[]),
            )
            .await;

        let scope = ParameterScope::Database("DB1".to_string());
        let result = fetch_parameters(&client, &scope).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn grants_statement_per_object_kind() {
        let client = MockClient::new();
        client
            .add_response("SHOW GRANTS ON DATABASE \"SALES\"", grid(&["privilege"], &[]))
            .await;
        client
            .add_response(
                "SHOW GRANTS ON SCHEMA \"SALES\".\"PUBLIC\"",
                grid(&["privilege"], &[]),
            )
            .await;
        client
            .add_response(
                "SHOW GRANTS ON TABLE \"SALES\".\"PUBLIC\".\"ORDERS\"",
                grid(&["privilege"], &[]),
            )
            .await;

        assert!(fetch_grants(&client, &ObjectRef::Database("SALES".into()))
            .await
            .is_ok());
        assert!(fetch_grants(
            &client,
            &ObjectRef::Schema {
                database: "SALES".into(),
                name: "PUBLIC".into()
            }
        )
        .await
        .is_ok());
        assert!(
            fetch_grants(&client, &ObjectRef::Table(TableRef::new("SALES", "PUBLIC", "ORDERS")))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn sample_rows_caps_row_count() {
        let client = MockClient::new();
        let rows: Vec<&[&str]> = vec![&["1"]; 12];
        client
            .add_response(
                "SELECT * FROM \"DB\".\"SCH\".\"T\" LIMIT 10",
                grid(&["id"], &rows),
            )
            .await;

        let table = TableRef::new("DB", "SCH", "T");
        let sample = sample_rows(&client, &table, 10).await.unwrap();
        assert_eq!(sample.row_count(), 10);
    }

    #[tokio::test]
    async fn base_table_listing_parses_pairs() {
        let client = MockClient::new();
        client
            .add_response(
                "SELECT table_schema, table_name FROM \"DB1\".information_schema.tables \
                 WHERE table_type = 'BASE TABLE' ORDER BY table_schema, table_name",
                grid(
                    &["TABLE_SCHEMA", "TABLE_NAME"],
                    &[&["PUBLIC", "ORDERS"], &["PUBLIC", "USERS"]],
                ),
            )
            .await;

        let pairs = list_base_tables(&client, "DB1").await.unwrap();
        assert_eq!(
            pairs,
            vec![
                ("PUBLIC".to_string(), "ORDERS".to_string()),
                ("PUBLIC".to_string(), "USERS".to_string())
            ]
        );
    }
}
