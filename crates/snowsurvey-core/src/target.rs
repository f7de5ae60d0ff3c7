//! Target identities
//!
//! A target is one named warehouse object (or singleton scope) against which
//! one metadata statement is issued. Identity is the scope plus qualifying
//! names; names are opaque strings that must be quoted before they touch SQL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parameter-bearing scope: `SHOW PARAMETERS IN <scope>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterScope {
    /// Account-wide parameters (singleton)
    Account,

    /// Session parameters (singleton)
    Session,

    /// Parameters of one database
    Database(String),

    /// Parameters of one warehouse
    Warehouse(String),
}

impl ParameterScope {
    /// Deterministic result label, stable across runs for the same target.
    pub fn label(&self) -> String {
        match self {
            Self::Account => "ACCOUNT".to_string(),
            Self::Session => "SESSION".to_string(),
            Self::Database(name) => format!("DATABASE_{}", name),
            Self::Warehouse(name) => format!("WAREHOUSE_{}", name),
        }
    }

    /// The qualifying object name, if this scope has one.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            Self::Account | Self::Session => None,
            Self::Database(name) | Self::Warehouse(name) => Some(name),
        }
    }
}

impl fmt::Display for ParameterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identifies a table in the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Database name
    pub database: String,

    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableRef {
    /// Create a new table reference
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// A grant-bearing object: `SHOW GRANTS ON <kind> <name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRef {
    Database(String),
    Schema { database: String, name: String },
    Table(TableRef),
}

impl ObjectRef {
    /// The object kind keyword as it appears in SQL
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE",
            Self::Schema { .. } => "SCHEMA",
            Self::Table(_) => "TABLE",
        }
    }

    /// Fully qualified dotted name
    pub fn fqn(&self) -> String {
        match self {
            Self::Database(name) => name.clone(),
            Self::Schema { database, name } => format!("{}.{}", database, name),
            Self::Table(table) => table.fqn(),
        }
    }

    /// Deterministic result label, e.g. `SALES.PUBLIC [SCHEMA]`.
    pub fn label(&self) -> String {
        format!("{} [{}]", self.fqn(), self.kind())
    }

    /// Name components in database→schema→table order.
    pub fn name_parts(&self) -> Vec<&str> {
        match self {
            Self::Database(name) => vec![name],
            Self::Schema { database, name } => vec![database, name],
            Self::Table(t) => vec![&t.database, &t.schema, &t.table],
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
