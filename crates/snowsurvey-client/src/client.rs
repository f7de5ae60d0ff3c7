//! Warehouse client trait

use snowsurvey_core::Grid;

/// Errors that can occur while talking to the warehouse
///
/// A zero-row result is NOT an error: `execute` returns an empty `Grid` for
/// it. Callers that require non-empty output decide that for themselves.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Statement failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for warehouse clients that execute metadata statements
#[async_trait::async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Get the client name (e.g., "Snowflake")
    fn name(&self) -> &'static str;

    /// Execute one statement and return its tabular result.
    ///
    /// Zero rows is a successful result, distinguishable from every error
    /// variant.
    async fn execute(&self, sql: &str) -> Result<Grid, ClientError>;

    /// Probe the session with a trivial statement.
    ///
    /// Useful for surfacing connection problems before a long harvest starts.
    async fn test_connection(&self) -> Result<(), ClientError> {
        self.execute("SELECT 1").await.map(|_| ())
    }
}
