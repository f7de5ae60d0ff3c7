//! snowsurvey core
//!
//! Domain model shared by every pipeline stage: the tabular result type,
//! target identities, identifier safety, and configuration.

pub mod config;
pub mod grid;
pub mod ident;
pub mod target;

pub use config::{Config, ConfigError, ConnectionConfig, HarvestConfig};
pub use grid::{Cell, Grid};
pub use ident::{check_ident, quote_ident, IdentError};
pub use target::{ObjectRef, ParameterScope, TableRef};
