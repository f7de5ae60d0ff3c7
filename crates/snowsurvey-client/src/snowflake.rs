//! Snowflake client over the `snowflake-api` SDK
//!
//! Executes metadata statements through an authenticated session and decodes
//! both result formats the SDK returns (Arrow batches for query-shaped
//! output, JSON for `SHOW`-style commands) into [`Grid`]s.
//!
//! ## Authentication Methods
//!
//! 1. Password authentication (username/password)
//! 2. Key-pair authentication (private key PEM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = SnowflakeClient::with_password("abc-xy12345", "surveyor", "secret")
//!     .with_warehouse("COMPUTE_WH")
//!     .with_role("ACCOUNTADMIN")
//!     .build()?;
//! let grid = client.execute("SHOW DATABASES").await?;
//! ```

use crate::client::{ClientError, WarehouseClient};
use snowsurvey_core::Grid;

#[cfg(feature = "snowflake")]
use snowflake_api::SnowflakeApi;

/// Snowflake authentication credentials
#[derive(Clone)]
pub enum SnowflakeCredentials {
    /// Password-based authentication
    Password(String),
    /// Key-pair authentication (PEM format private key)
    PrivateKey(String),
}

/// Builder for SnowflakeClient
pub struct SnowflakeClientBuilder {
    account: String,
    username: String,
    credentials: SnowflakeCredentials,
    warehouse: Option<String>,
    role: Option<String>,
    database: Option<String>,
}

impl SnowflakeClientBuilder {
    /// Create new builder with password authentication
    pub fn with_password(
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials: SnowflakeCredentials::Password(password.into()),
            warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Create new builder with key-pair authentication
    pub fn with_key_pair(
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials: SnowflakeCredentials::PrivateKey(private_key_pem.into()),
            warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Set the warehouse to use
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    /// Set the role to use
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the default database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Build the client
    #[cfg(feature = "snowflake")]
    pub fn build(self) -> Result<SnowflakeClient, ClientError> {
        let api = match &self.credentials {
            SnowflakeCredentials::Password(password) => SnowflakeApi::with_password_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                None, // schema
                &self.username,
                self.role.as_deref(),
                password,
            )
            .map_err(|e| {
                ClientError::AuthenticationError(format!(
                    "Failed to authenticate with Snowflake: {}",
                    e
                ))
            })?,
            SnowflakeCredentials::PrivateKey(private_key_pem) => {
                SnowflakeApi::with_certificate_auth(
                    &self.account,
                    self.warehouse.as_deref(),
                    self.database.as_deref(),
                    None, // schema
                    &self.username,
                    self.role.as_deref(),
                    private_key_pem,
                )
                .map_err(|e| {
                    ClientError::AuthenticationError(format!(
                        "Failed to authenticate with key-pair: {}",
                        e
                    ))
                })?
            }
        };

        Ok(SnowflakeClient {
            api,
            account: self.account,
        })
    }

    /// Build without snowflake feature
    #[cfg(not(feature = "snowflake"))]
    pub fn build(self) -> Result<SnowflakeClient, ClientError> {
        Err(ClientError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake"
                .to_string(),
        ))
    }
}

/// Snowflake warehouse client
pub struct SnowflakeClient {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    #[allow(dead_code)]
    account: String,

    #[cfg(not(feature = "snowflake"))]
    _phantom: std::marker::PhantomData<()>,
}

impl SnowflakeClient {
    /// Builder entry point with password authentication
    pub fn with_password(
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SnowflakeClientBuilder {
        SnowflakeClientBuilder::with_password(account, username, password)
    }

    /// Builder entry point with key-pair authentication
    pub fn with_key_pair(
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> SnowflakeClientBuilder {
        SnowflakeClientBuilder::with_key_pair(account, username, private_key_pem)
    }
}

/// Map an SDK execution error onto the client error taxonomy by message.
///
/// The SDK surfaces one error type for everything; the server message is the
/// only signal for not-found vs permission failures.
#[cfg_attr(not(feature = "snowflake"), allow(dead_code))]
fn classify_exec_error(message: String) -> ClientError {
    if message.contains("does not exist") || message.contains("not found") {
        ClientError::ObjectNotFound(message)
    } else if message.contains("Insufficient privileges") || message.contains("Permission") {
        ClientError::PermissionDenied(message)
    } else {
        ClientError::QueryError(message)
    }
}

#[cfg(feature = "snowflake")]
fn grid_from_batches(batches: Vec<arrow_array::RecordBatch>) -> Result<Grid, ClientError> {
    use arrow_array::Array;
    use arrow_cast::display::{ArrayFormatter, FormatOptions};

    let mut grid = match batches.first() {
        Some(batch) => Grid::new(
            batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect(),
        ),
        None => return Ok(Grid::new(Vec::new())),
    };

    let options = FormatOptions::default();
    for batch in &batches {
        let formatters = batch
            .columns()
            .iter()
            .map(|array| ArrayFormatter::try_new(array.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&formatters)
                .map(|(array, formatter)| {
                    if array.is_null(row) {
                        None
                    } else {
                        Some(formatter.value(row).to_string())
                    }
                })
                .collect();
            grid.rows.push(cells);
        }
    }
    Ok(grid)
}

#[cfg(feature = "snowflake")]
fn grid_from_json(json: snowflake_api::JsonResult) -> Result<Grid, ClientError> {
    fn cell(value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    let columns = json.schema.iter().map(|f| f.name.clone()).collect();
    let mut grid = Grid::new(columns);

    let rows = json.value.as_array().ok_or_else(|| {
        ClientError::InvalidResponse("JSON result is not an array of rows".to_string())
    })?;
    for row in rows {
        let values = row.as_array().ok_or_else(|| {
            ClientError::InvalidResponse("JSON result row is not an array".to_string())
        })?;
        grid.push_row(values.iter().map(cell).collect());
    }
    Ok(grid)
}

#[async_trait::async_trait]
impl WarehouseClient for SnowflakeClient {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    #[cfg(feature = "snowflake")]
    async fn execute(&self, sql: &str) -> Result<Grid, ClientError> {
        use snowflake_api::QueryResult;

        tracing::debug!(statement = sql, "executing");
        let result = self
            .api
            .exec(sql)
            .await
            .map_err(|e| classify_exec_error(e.to_string()))?;

        match result {
            QueryResult::Arrow(batches) => grid_from_batches(batches),
            QueryResult::Json(json) => grid_from_json(json),
            QueryResult::Empty => Ok(Grid::new(Vec::new())),
        }
    }

    #[cfg(not(feature = "snowflake"))]
    async fn execute(&self, _sql: &str) -> Result<Grid, ClientError> {
        Err(ClientError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_error_classification() {
        assert!(matches!(
            classify_exec_error("Database 'X' does not exist or not authorized".to_string()),
            ClientError::ObjectNotFound(_)
        ));
        assert!(matches!(
            classify_exec_error("Insufficient privileges to operate on warehouse".to_string()),
            ClientError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_exec_error("unexpected token".to_string()),
            ClientError::QueryError(_)
        ));
    }

    #[test]
    fn builder_collects_session_options() {
        let builder = SnowflakeClient::with_password("account", "user", "pass")
            .with_warehouse("COMPUTE_WH")
            .with_role("ANALYST")
            .with_database("SALES");

        assert_eq!(builder.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert_eq!(builder.role.as_deref(), Some("ANALYST"));
        assert_eq!(builder.database.as_deref(), Some("SALES"));
    }
}
