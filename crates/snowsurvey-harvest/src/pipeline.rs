//! The three harvest pipelines
//!
//! Each pipeline runs resolve → fetch → aggregate to completion for one user
//! trigger. Fetches execute strictly sequentially in resolved-target order
//! (scope declaration order, then list order); re-running against unchanged
//! warehouse state reproduces the same aggregate.

use snowsurvey_client::{ClientError, WarehouseClient};
use snowsurvey_core::{check_ident, HarvestConfig, ParameterScope, TableRef};

use crate::aggregate::{
    DescribeColumnMap, ExcludedTarget, HarvestFailure, HarvestResult, TableDefinitions,
    TableSample,
};
use crate::fetch::{
    describe_table, fetch_grants, fetch_parameters, list_base_tables, sample_rows, FetchFailure,
};
use crate::resolve::{
    list_databases, list_warehouses, resolve_grant_objects, GrantSelection, Selection,
    SkippedBranch,
};

/// Parameter scope levels, in user declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLevel {
    Account,
    Session,
    Database,
    Warehouse,
}

/// One parameter-harvest trigger
#[derive(Debug, Clone)]
pub struct ParameterRequest {
    /// Levels to fetch, in declaration order
    pub levels: Vec<ParameterLevel>,

    /// Database selection, used when `levels` contains `Database`
    pub databases: Selection,

    /// Warehouse selection, used when `levels` contains `Warehouse`
    pub warehouses: Selection,
}

impl Default for ParameterRequest {
    fn default() -> Self {
        Self {
            levels: vec![ParameterLevel::Account, ParameterLevel::Session],
            databases: Selection::All,
            warehouses: Selection::All,
        }
    }
}

/// One definitions-harvest trigger
#[derive(Debug, Clone)]
pub struct DefinitionRequest {
    /// Databases to crawl
    pub databases: Selection,
}

impl Default for DefinitionRequest {
    fn default() -> Self {
        Self {
            databases: Selection::All,
        }
    }
}

/// Harvest configuration parameters across the selected scopes.
pub async fn harvest_parameters(
    client: &dyn WarehouseClient,
    request: &ParameterRequest,
) -> HarvestResult {
    let mut result = HarvestResult::new();

    let mut seen_levels = Vec::new();
    for level in &request.levels {
        if seen_levels.contains(level) {
            continue;
        }
        seen_levels.push(*level);

        match level {
            ParameterLevel::Account => {
                fetch_singleton(client, &mut result, ParameterScope::Account).await;
            }
            ParameterLevel::Session => {
                fetch_singleton(client, &mut result, ParameterScope::Session).await;
            }
            ParameterLevel::Database => {
                let available = match list_databases(client).await {
                    Ok(names) => names,
                    Err(error) => {
                        tracing::warn!(%error, "database listing failed, level skipped");
                        result.skipped.push(SkippedBranch {
                            parent: "databases".to_string(),
                            error,
                        });
                        continue;
                    }
                };
                for name in request.databases.resolve(&available) {
                    fetch_named(client, &mut result, name, ParameterScope::Database).await;
                }
            }
            ParameterLevel::Warehouse => {
                let available = match list_warehouses(client).await {
                    Ok(names) => names,
                    Err(error) => {
                        tracing::warn!(%error, "warehouse listing failed, level skipped");
                        result.skipped.push(SkippedBranch {
                            parent: "warehouses".to_string(),
                            error,
                        });
                        continue;
                    }
                };
                for name in request.warehouses.resolve(&available) {
                    fetch_named(client, &mut result, name, ParameterScope::Warehouse).await;
                }
            }
        }
    }

    result
}

async fn fetch_singleton(
    client: &dyn WarehouseClient,
    result: &mut HarvestResult,
    scope: ParameterScope,
) {
    let label = scope.label();
    match fetch_parameters(client, &scope).await {
        Ok(grid) => result.push_entry(label, grid),
        Err(error) => result.push_failure(label, error),
    }
}

async fn fetch_named(
    client: &dyn WarehouseClient,
    result: &mut HarvestResult,
    name: String,
    make_scope: fn(String) -> ParameterScope,
) {
    if let Err(reason) = check_ident(&name) {
        result.excluded.push(ExcludedTarget { name, reason });
        return;
    }

    let scope = make_scope(name.clone());
    match fetch_parameters(client, &scope).await {
        Ok(grid) => result.push_entry(scope.label(), grid),
        Err(error) => {
            tracing::warn!(scope = %name, %error, "parameter fetch failed");
            result.push_failure(name, error);
        }
    }
}

/// Crawl the selected databases and harvest table definitions plus sample
/// rows, isolating every per-table failure.
pub async fn harvest_definitions(
    client: &dyn WarehouseClient,
    request: &DefinitionRequest,
    config: &HarvestConfig,
) -> TableDefinitions {
    let mut defs = TableDefinitions::new();
    let map = DescribeColumnMap::default();

    let available = match list_databases(client).await {
        Ok(names) => names,
        Err(error) => {
            tracing::warn!(%error, "database listing failed, nothing to crawl");
            defs.skipped.push(SkippedBranch {
                parent: "account".to_string(),
                error,
            });
            return defs;
        }
    };

    for database in request.databases.resolve(&available) {
        if config.is_database_excluded(&database) {
            continue;
        }
        if let Err(reason) = check_ident(&database) {
            defs.excluded.push(ExcludedTarget {
                name: database,
                reason,
            });
            continue;
        }

        let pairs = match list_base_tables(client, &database).await {
            Ok(pairs) => pairs,
            Err(error) => {
                tracing::warn!(database = %database, %error, "table enumeration failed, branch skipped");
                defs.skipped.push(SkippedBranch {
                    parent: database.clone(),
                    error: listing_error(error),
                });
                continue;
            }
        };

        for (schema, table) in pairs {
            let fqn = format!("{}.{}.{}", database, schema, table);
            if let Err(reason) = check_ident(&schema).and_then(|_| check_ident(&table)) {
                defs.excluded.push(ExcludedTarget { name: fqn, reason });
                continue;
            }
            let table_ref = TableRef::new(&database, &schema, &table);

            let harmonized = match describe_table(client, &table_ref).await {
                Ok(raw) => map
                    .apply(&raw)
                    .map_err(|e| FetchFailure::Malformed(e.to_string())),
                Err(error) => Err(error),
            };
            match harmonized {
                Ok(grid) => defs.push_table(&table_ref, &grid),
                Err(error) => {
                    tracing::warn!(table = %fqn, %error, "definition fetch failed");
                    defs.failures.push(HarvestFailure { target: fqn, error });
                }
            }

            let outcome = sample_rows(client, &table_ref, config.sample_rows).await;
            defs.samples.push(TableSample {
                table: table_ref,
                outcome,
            });
        }
    }

    defs
}

fn listing_error(failure: FetchFailure) -> ClientError {
    match failure {
        FetchFailure::Query(error) => error,
        other => ClientError::InvalidResponse(other.to_string()),
    }
}

/// Resolve the grants cascade and harvest `SHOW GRANTS` per object.
pub async fn harvest_grants(
    client: &dyn WarehouseClient,
    selection: &GrantSelection,
) -> HarvestResult {
    let resolved = resolve_grant_objects(client, selection).await;

    let mut result = HarvestResult::new();
    result.skipped = resolved.skipped;
    result.excluded = resolved.excluded;

    for object in resolved.objects {
        match fetch_grants(client, &object).await {
            Ok(grid) => result.push_entry(object.label(), grid),
            Err(error) => {
                tracing::warn!(object = %object, %error, "grant fetch failed");
                result.push_failure(object.label(), error);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowsurvey_client::MockClient;
    use snowsurvey_core::Grid;

    fn grid(columns: &[&str], rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Some(v.to_string())).collect())
                .collect(),
        )
    }

    fn show_names(names: &[&str]) -> Grid {
        Grid::from_rows(
            vec!["created_on".to_string(), "name".to_string()],
            names
                .iter()
                .map(|n| vec![Some("2024-01-01".to_string()), Some(n.to_string())])
                .collect(),
        )
    }

    fn params() -> Grid {
        grid(&["key", "value"], &[&["TIMEZONE", "UTC"]])
    }

    #[tokio::test]
    async fn levels_run_in_declaration_order() {
        let client = MockClient::new();
        client.add_response("SHOW PARAMETERS IN SESSION", params()).await;
        client.add_response("SHOW PARAMETERS IN ACCOUNT", params()).await;

        let request = ParameterRequest {
            levels: vec![ParameterLevel::Session, ParameterLevel::Account],
            ..Default::default()
        };
        let result = harvest_parameters(&client, &request).await;

        assert_eq!(result.labels(), vec!["SESSION", "ACCOUNT"]);
        assert!(result.is_clean());
    }

    #[tokio::test]
    async fn database_failure_does_not_abort_siblings() {
        let client = MockClient::new();
        client
            .add_response("SHOW DATABASES", show_names(&["DB1", "DB2", "DB3"]))
            .await;
        client
            .add_response("SHOW PARAMETERS IN DATABASE \"DB1\"", params())
            .await;
        client
            .add_error(
                "SHOW PARAMETERS IN DATABASE \"DB2\"",
                ClientError::PermissionDenied("permission denied".to_string()),
            )
            .await;
        client
            .add_response("SHOW PARAMETERS IN DATABASE \"DB3\"", params())
            .await;

        let request = ParameterRequest {
            levels: vec![ParameterLevel::Database],
            ..Default::default()
        };
        let result = harvest_parameters(&client, &request).await;

        assert_eq!(result.labels(), vec!["DATABASE_DB1", "DATABASE_DB3"]);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures[0].target, "DB2");
        assert!(result.failures[0].error.to_string().contains("permission denied"));
        // Every submitted target is accounted for.
        assert_eq!(result.success_count() + result.failure_count(), 3);
    }

    #[tokio::test]
    async fn failed_resume_then_empty_parameters_is_empty_result_failure() {
        let client = MockClient::new();
        client
            .add_response("SHOW WAREHOUSES", show_names(&["WH1"]))
            .await;
        // Resume is not scripted: it errors and must be swallowed.
        client
            .add_response(
                "SHOW PARAMETERS IN WAREHOUSE \"WH1\"",
                grid(&["key", "value"], &[]),
            )
            .await;

        let request = ParameterRequest {
            levels: vec![ParameterLevel::Warehouse],
            ..Default::default()
        };
        let result = harvest_parameters(&client, &request).await;

        assert!(client.was_executed("ALTER WAREHOUSE \"WH1\" RESUME").await);
        assert_eq!(result.success_count(), 0);
        assert_eq!(result.failures[0].target, "WH1");
        assert!(matches!(
            result.failures[0].error,
            FetchFailure::EmptyResult
        ));
    }

    #[tokio::test]
    async fn listing_failure_skips_level_and_continues() {
        let client = MockClient::new();
        client.add_response("SHOW PARAMETERS IN ACCOUNT", params()).await;
        // SHOW DATABASES is not scripted and fails.

        let request = ParameterRequest {
            levels: vec![ParameterLevel::Database, ParameterLevel::Account],
            ..Default::default()
        };
        let result = harvest_parameters(&client, &request).await;

        assert_eq!(result.labels(), vec!["ACCOUNT"]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].parent, "databases");
    }

    #[tokio::test]
    async fn control_character_names_are_excluded_not_fetched() {
        let client = MockClient::new();
        client
            .add_response("SHOW DATABASES", show_names(&["GOOD", "BAD\nDB"]))
            .await;
        client
            .add_response("SHOW PARAMETERS IN DATABASE \"GOOD\"", params())
            .await;

        let request = ParameterRequest {
            levels: vec![ParameterLevel::Database],
            ..Default::default()
        };
        let result = harvest_parameters(&client, &request).await;

        assert_eq!(result.labels(), vec!["DATABASE_GOOD"]);
        assert_eq!(result.excluded.len(), 1);
        assert_eq!(result.excluded[0].name, "BAD\nDB");
        // The rejected name never reached the warehouse.
        let statements = client.executed_statements().await;
        assert!(statements.iter().all(|s| !s.contains("BAD")));
    }
}
