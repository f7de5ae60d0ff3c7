//! Warehouse client for metadata statements
//!
//! One authenticated session per run, reused across every fetch. Statements
//! are metadata commands (`SHOW …`, `DESCRIBE …`, small `SELECT`s) whose
//! results come back as [`snowsurvey_core::Grid`] values.
//!
//! Enable the real backend with the `snowflake` cargo feature; without it the
//! crate still builds and [`MockClient`] covers every test path.

pub mod client;
pub mod mock;
pub mod snowflake;

pub use client::{ClientError, WarehouseClient};
pub use mock::{MockClient, MockClientBuilder};
pub use snowflake::{SnowflakeClient, SnowflakeClientBuilder};
