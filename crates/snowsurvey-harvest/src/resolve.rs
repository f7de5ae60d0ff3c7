//! Target resolution
//!
//! Turns a scope selection (the `ALL` sentinel or an explicit list) into
//! the concrete set of named targets to fetch, listing available objects and
//! cascading database → schema → table where the scope is hierarchical.
//!
//! Selection policy: an empty selection resolves to an empty target set at
//! every scope; `ALL` is the only way to request the full available list.

use snowsurvey_client::{ClientError, WarehouseClient};
use snowsurvey_core::{check_ident, quote_ident, ObjectRef, TableRef};
use std::collections::{HashMap, HashSet};

use crate::aggregate::ExcludedTarget;

/// A scope selection: everything available, or an explicit list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The `ALL` sentinel: resolve to the full available list
    All,

    /// An explicit list; empty means no targets
    Names(Vec<String>),
}

impl Selection {
    /// Build a selection from raw argument values. Any value equal to `ALL`
    /// (case-insensitive) makes the whole selection `All`, mirroring a
    /// multi-select with the sentinel ticked alongside concrete names.
    pub fn from_values(values: &[String]) -> Self {
        if values.iter().any(|v| v.eq_ignore_ascii_case("ALL")) {
            Self::All
        } else {
            Self::Names(values.to_vec())
        }
    }

    /// An empty explicit selection
    pub fn none() -> Self {
        Self::Names(Vec::new())
    }

    /// Resolve against the available list.
    ///
    /// `All` yields the available list order-preserving and deduplicated; an
    /// explicit list yields its intersection with the available set, in the
    /// order given, deduplicated. An empty available list with `All` yields
    /// an empty target set, not an error.
    pub fn resolve(&self, available: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        match self {
            Self::All => available
                .iter()
                .filter(|name| seen.insert((*name).clone()))
                .cloned()
                .collect(),
            Self::Names(names) => {
                let available: HashSet<&str> = available.iter().map(String::as_str).collect();
                names
                    .iter()
                    .filter(|name| available.contains(name.as_str()))
                    .filter(|name| seen.insert((*name).clone()))
                    .cloned()
                    .collect()
            }
        }
    }
}

/// A cascade branch that could not be enumerated.
///
/// All descendant targets of the branch are treated as unavailable; the rest
/// of the harvest proceeds.
#[derive(Debug, Clone)]
pub struct SkippedBranch {
    /// The scope that failed to list, e.g. `SALES` or `SALES.PUBLIC`
    pub parent: String,

    /// The listing error
    pub error: ClientError,
}

/// Scope selections for the grants cascade
#[derive(Debug, Clone)]
pub struct GrantSelection {
    /// Database names
    pub databases: Selection,

    /// Fully qualified `database.schema` names
    pub schemas: Selection,

    /// Fully qualified `database.schema.table` names
    pub tables: Selection,
}

/// Output of the grants cascade resolution
#[derive(Debug, Default)]
pub struct ResolvedObjects {
    /// Grant-bearing objects in scope order: databases, schemas, tables
    pub objects: Vec<ObjectRef>,

    /// Branches whose listing failed
    pub skipped: Vec<SkippedBranch>,

    /// Names rejected by identifier validation
    pub excluded: Vec<ExcludedTarget>,
}

impl Default for GrantSelection {
    fn default() -> Self {
        Self {
            databases: Selection::All,
            schemas: Selection::All,
            tables: Selection::All,
        }
    }
}

/// List database names in the account
pub async fn list_databases(client: &dyn WarehouseClient) -> Result<Vec<String>, ClientError> {
    Ok(client.execute("SHOW DATABASES").await?.name_values())
}

/// List warehouse names in the account
pub async fn list_warehouses(client: &dyn WarehouseClient) -> Result<Vec<String>, ClientError> {
    Ok(client.execute("SHOW WAREHOUSES").await?.name_values())
}

/// List schema names in one database
pub async fn list_schemas(
    client: &dyn WarehouseClient,
    database: &str,
) -> Result<Vec<String>, ClientError> {
    let sql = format!("SHOW SCHEMAS IN DATABASE {}", quote_ident(database));
    Ok(client.execute(&sql).await?.name_values())
}

/// List table names in one schema
pub async fn list_tables(
    client: &dyn WarehouseClient,
    database: &str,
    schema: &str,
) -> Result<Vec<String>, ClientError> {
    let sql = format!(
        "SHOW TABLES IN SCHEMA {}.{}",
        quote_ident(database),
        quote_ident(schema)
    );
    Ok(client.execute(&sql).await?.name_values())
}

/// Resolve the grants cascade: databases, then schemas per database, then
/// tables per schema, each level applying its own selection independently.
pub async fn resolve_grant_objects(
    client: &dyn WarehouseClient,
    selection: &GrantSelection,
) -> ResolvedObjects {
    let mut resolved = ResolvedObjects::default();

    let available_dbs = match list_databases(client).await {
        Ok(names) => names,
        Err(error) => {
            tracing::warn!(%error, "database listing failed, skipping grants cascade");
            resolved.skipped.push(SkippedBranch {
                parent: "account".to_string(),
                error,
            });
            return resolved;
        }
    };

    let mut valid_dbs = Vec::new();
    for name in selection.databases.resolve(&available_dbs) {
        match check_ident(&name) {
            Ok(()) => {
                resolved.objects.push(ObjectRef::Database(name.clone()));
                valid_dbs.push(name);
            }
            Err(reason) => resolved.excluded.push(ExcludedTarget { name, reason }),
        }
    }

    // Schema level: selection applies to qualified db.schema names.
    let mut available_schemas = Vec::new();
    let mut schema_map: HashMap<String, (String, String)> = HashMap::new();
    for db in &valid_dbs {
        match list_schemas(client, db).await {
            Ok(names) => {
                for schema in names {
                    let qualified = format!("{}.{}", db, schema);
                    if let Err(reason) = check_ident(&schema) {
                        resolved.excluded.push(ExcludedTarget {
                            name: qualified,
                            reason,
                        });
                        continue;
                    }
                    available_schemas.push(qualified.clone());
                    schema_map.insert(qualified, (db.clone(), schema));
                }
            }
            Err(error) => {
                tracing::warn!(database = %db, %error, "schema listing failed, branch skipped");
                resolved.skipped.push(SkippedBranch {
                    parent: db.clone(),
                    error,
                });
            }
        }
    }

    let mut valid_schemas = Vec::new();
    for qualified in selection.schemas.resolve(&available_schemas) {
        // resolve() only returns names from available_schemas, all mapped
        if let Some((db, schema)) = schema_map.get(&qualified) {
            resolved.objects.push(ObjectRef::Schema {
                database: db.clone(),
                name: schema.clone(),
            });
            valid_schemas.push((db.clone(), schema.clone()));
        }
    }

    // Table level.
    let mut available_tables = Vec::new();
    let mut table_map: HashMap<String, TableRef> = HashMap::new();
    for (db, schema) in &valid_schemas {
        match list_tables(client, db, schema).await {
            Ok(names) => {
                for table in names {
                    let qualified = format!("{}.{}.{}", db, schema, table);
                    if let Err(reason) = check_ident(&table) {
                        resolved.excluded.push(ExcludedTarget {
                            name: qualified,
                            reason,
                        });
                        continue;
                    }
                    available_tables.push(qualified.clone());
                    table_map.insert(qualified, TableRef::new(db, schema, table));
                }
            }
            Err(error) => {
                tracing::warn!(schema = %format!("{}.{}", db, schema), %error, "table listing failed, branch skipped");
                resolved.skipped.push(SkippedBranch {
                    parent: format!("{}.{}", db, schema),
                    error,
                });
            }
        }
    }

    for qualified in selection.tables.resolve(&available_tables) {
        if let Some(table) = table_map.get(&qualified) {
            resolved.objects.push(ObjectRef::Table(table.clone()));
        }
    }

    resolved
}
