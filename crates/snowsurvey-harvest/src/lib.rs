//! Metadata harvesting pipeline
//!
//! Three sibling pipelines share one shape: resolve the concrete target set,
//! issue one metadata statement per target with per-target fault isolation,
//! and fold the outcomes into an ordered aggregate ready for export.
//!
//! Only session establishment is fatal. Everything downstream of it (a
//! listing that fails, a target that cannot be described, a warehouse that
//! will not wake up) degrades to a recorded failure while the rest of the
//! harvest proceeds.

pub mod aggregate;
pub mod fetch;
pub mod pipeline;
pub mod resolve;

pub use aggregate::{
    DescribeColumnMap, ExcludedTarget, HarvestEntry, HarvestFailure, HarvestResult, RemapError,
    TableDefinitions, TableSample, DEFINITION_COLUMNS,
};
pub use fetch::FetchFailure;
pub use pipeline::{
    harvest_definitions, harvest_grants, harvest_parameters, DefinitionRequest, ParameterLevel,
    ParameterRequest,
};
pub use resolve::{GrantSelection, ResolvedObjects, Selection, SkippedBranch};
