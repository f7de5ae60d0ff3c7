//! Mock warehouse client for testing
//!
//! Returns scripted results without connecting anywhere. Useful for:
//! - Unit testing resolve/fetch/aggregate behavior
//! - Simulating per-statement error conditions
//! - CI runs without real credentials
//!
//! Every executed statement is recorded, so tests can assert on side-effect
//! statements (e.g. the best-effort warehouse resume) as well as on results.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = MockClient::new();
//! client.add_response("SHOW DATABASES", grid).await;
//! client
//!     .add_error("SHOW PARAMETERS IN DATABASE \"DB2\"",
//!                ClientError::PermissionDenied("permission denied".into()))
//!     .await;
//! ```

use crate::client::{ClientError, WarehouseClient};
use snowsurvey_core::Grid;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock warehouse client with scripted responses
pub struct MockClient {
    /// Scripted results keyed by exact statement text
    responses: Arc<RwLock<HashMap<String, Result<Grid, ClientError>>>>,

    /// Every statement executed, in order
    log: Arc<RwLock<Vec<String>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Name to return from name()
    client_name: &'static str,
}

impl MockClient {
    /// Create a new mock client with no scripted responses
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            log: Arc::new(RwLock::new(Vec::new())),
            fail_connection: false,
            client_name: "Mock",
        }
    }

    /// Script a successful result for a statement
    pub async fn add_response(&self, sql: impl Into<String>, grid: Grid) {
        self.responses.write().await.insert(sql.into(), Ok(grid));
    }

    /// Script an error for a statement
    pub async fn add_error(&self, sql: impl Into<String>, error: ClientError) {
        self.responses.write().await.insert(sql.into(), Err(error));
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set a custom client name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.client_name = name;
        self
    }

    /// Statements executed so far, in order
    pub async fn executed_statements(&self) -> Vec<String> {
        self.log.read().await.clone()
    }

    /// True when the exact statement has been executed
    pub async fn was_executed(&self, sql: &str) -> bool {
        self.log.read().await.iter().any(|s| s == sql)
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockClient {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            log: Arc::clone(&self.log),
            fail_connection: self.fail_connection,
            client_name: self.client_name,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseClient for MockClient {
    fn name(&self) -> &'static str {
        self.client_name
    }

    async fn execute(&self, sql: &str) -> Result<Grid, ClientError> {
        self.log.write().await.push(sql.to_string());

        match self.responses.read().await.get(sql) {
            Some(result) => result.clone(),
            None => Err(ClientError::QueryError(format!(
                "no scripted response for statement: {}",
                sql
            ))),
        }
    }

    async fn test_connection(&self) -> Result<(), ClientError> {
        if self.fail_connection {
            Err(ClientError::ConnectionError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Builder for creating a MockClient with multiple scripted statements
pub struct MockClientBuilder {
    responses: HashMap<String, Result<Grid, ClientError>>,
    fail_connection: bool,
    client_name: &'static str,
}

impl MockClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fail_connection: false,
            client_name: "Mock",
        }
    }

    /// Script a successful result for a statement
    pub fn with_response(mut self, sql: impl Into<String>, grid: Grid) -> Self {
        self.responses.insert(sql.into(), Ok(grid));
        self
    }

    /// Script an error for a statement
    pub fn with_error(mut self, sql: impl Into<String>, error: ClientError) -> Self {
        self.responses.insert(sql.into(), Err(error));
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set client name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.client_name = name;
        self
    }

    /// Build the MockClient
    pub fn build(self) -> MockClient {
        MockClient {
            responses: Arc::new(RwLock::new(self.responses)),
            log: Arc::new(RwLock::new(Vec::new())),
            fail_connection: self.fail_connection,
            client_name: self.client_name,
        }
    }
}

impl Default for MockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
