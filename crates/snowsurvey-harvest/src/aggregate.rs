//! Result aggregation
//!
//! Folds per-target fetch outcomes into one ordered aggregate keyed by
//! deterministic labels, harmonizes DESCRIBE-style output onto a fixed
//! column layout, and groups definition rows per table for preview and
//! export.

use snowsurvey_core::{Grid, IdentError, TableRef};
use std::collections::BTreeMap;

use crate::fetch::FetchFailure;
use crate::resolve::SkippedBranch;

/// One successful harvest entry
#[derive(Debug, Clone)]
pub struct HarvestEntry {
    /// Deterministic label, stable across runs for the same target
    pub label: String,

    /// The fetched result (possibly empty)
    pub grid: Grid,
}

/// One failed target
#[derive(Debug, Clone)]
pub struct HarvestFailure {
    /// Target name or label as submitted
    pub target: String,

    /// What went wrong
    pub error: FetchFailure,
}

/// A name rejected by identifier validation, never sent to the warehouse
#[derive(Debug, Clone)]
pub struct ExcludedTarget {
    pub name: String,
    pub reason: IdentError,
}

/// The aggregate of one harvest.
///
/// Every submitted target lands in exactly one of `entries` or `failures`;
/// names rejected up front are listed in `excluded` and branches that could
/// not be enumerated in `skipped`. Insertion order is fetch order.
#[derive(Debug, Default)]
pub struct HarvestResult {
    pub entries: Vec<HarvestEntry>,
    pub failures: Vec<HarvestFailure>,
    pub excluded: Vec<ExcludedTarget>,
    pub skipped: Vec<SkippedBranch>,
}

impl HarvestResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entry(&mut self, label: impl Into<String>, grid: Grid) {
        self.entries.push(HarvestEntry {
            label: label.into(),
            grid,
        });
    }

    pub fn push_failure(&mut self, target: impl Into<String>, error: FetchFailure) {
        self.failures.push(HarvestFailure {
            target: target.into(),
            error,
        });
    }

    /// Look up a successful entry by label
    pub fn get(&self, label: &str) -> Option<&Grid> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| &entry.grid)
    }

    /// Labels of successful entries, in insertion order
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn success_count(&self) -> usize {
        self.entries.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when nothing failed, was excluded, or was skipped
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.excluded.is_empty() && self.skipped.is_empty()
    }
}

/// Positional mapping from raw DESCRIBE output onto named definition columns.
///
/// DESCRIBE-style output is positional; the interesting fields sit at fixed
/// offsets. The mapping is data, not code, so it can be validated against the
/// actual column count before any indexing happens.
#[derive(Debug, Clone)]
pub struct DescribeColumnMap {
    /// (source position, target name) pairs, in target column order
    fields: Vec<(usize, String)>,
}

/// DESCRIBE output too narrow for the configured mapping
#[derive(Debug, Clone, thiserror::Error)]
#[error("DESCRIBE output has {actual} columns, mapping needs at least {required}")]
pub struct RemapError {
    pub required: usize,
    pub actual: usize,
}

impl Default for DescribeColumnMap {
    fn default() -> Self {
        Self {
            fields: [
                (0, "column_name"),
                (1, "data_type"),
                (3, "nullable"),
                (5, "primary_key"),
                (9, "comment"),
            ]
            .into_iter()
            .map(|(pos, name)| (pos, name.to_string()))
            .collect(),
        }
    }
}

impl DescribeColumnMap {
    /// Target column names, in order
    pub fn target_columns(&self) -> Vec<String> {
        self.fields.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Minimum source width the mapping can be applied to
    pub fn required_width(&self) -> usize {
        self.fields.iter().map(|(pos, _)| pos + 1).max().unwrap_or(0)
    }

    /// Apply the mapping: pick the mapped positions, rename them, drop the
    /// rest. Applying to an already-harmonized grid is a no-op.
    pub fn apply(&self, grid: &Grid) -> Result<Grid, RemapError> {
        if grid.columns == self.target_columns() {
            return Ok(grid.clone());
        }

        let required = self.required_width();
        if grid.column_count() < required {
            return Err(RemapError {
                required,
                actual: grid.column_count(),
            });
        }

        let positions: Vec<usize> = self.fields.iter().map(|(pos, _)| *pos).collect();
        let mut picked = grid.select_columns(&positions);
        picked.columns = self.target_columns();
        Ok(picked)
    }
}

/// Fixed column layout of aggregated definition rows
pub const DEFINITION_COLUMNS: [&str; 8] = [
    "database",
    "schema",
    "table",
    "column_name",
    "data_type",
    "nullable",
    "primary_key",
    "comment",
];

/// Sample rows of one table, or the failure that replaced them
#[derive(Debug, Clone)]
pub struct TableSample {
    pub table: TableRef,
    pub outcome: Result<Grid, FetchFailure>,
}

/// Aggregated table definitions across the crawled databases
#[derive(Debug)]
pub struct TableDefinitions {
    /// All definition rows in the fixed 8-column layout, fetch order
    pub rows: Grid,

    /// Per-table sample data, fetch order
    pub samples: Vec<TableSample>,

    /// Per-target failures (describe or enumeration shape problems)
    pub failures: Vec<HarvestFailure>,

    /// Names rejected by identifier validation
    pub excluded: Vec<ExcludedTarget>,

    /// Branches whose enumeration failed
    pub skipped: Vec<SkippedBranch>,
}

impl Default for TableDefinitions {
    fn default() -> Self {
        Self {
            rows: Grid::new(DEFINITION_COLUMNS.iter().map(|c| c.to_string()).collect()),
            samples: Vec::new(),
            failures: Vec::new(),
            excluded: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl TableDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the harmonized definition rows of one table
    pub fn push_table(&mut self, table: &TableRef, harmonized: &Grid) {
        for row in &harmonized.rows {
            let mut cells = Vec::with_capacity(DEFINITION_COLUMNS.len());
            cells.push(Some(table.database.clone()));
            cells.push(Some(table.schema.clone()));
            cells.push(Some(table.table.clone()));
            cells.extend(row.iter().cloned());
            self.rows.push_row(cells);
        }
    }

    /// Group definition rows by table, lexicographically ordered on
    /// `(database, schema, table)`. Each group keeps the five definition
    /// columns in fixed order.
    pub fn grouped(&self) -> BTreeMap<TableRef, Grid> {
        let definition_columns: Vec<String> =
            DEFINITION_COLUMNS[3..].iter().map(|c| c.to_string()).collect();

        let mut groups: BTreeMap<TableRef, Grid> = BTreeMap::new();
        for row in &self.rows.rows {
            let table = TableRef::new(
                row.first().cloned().flatten().unwrap_or_default(),
                row.get(1).cloned().flatten().unwrap_or_default(),
                row.get(2).cloned().flatten().unwrap_or_default(),
            );
            groups
                .entry(table)
                .or_insert_with(|| Grid::new(definition_columns.clone()))
                .push_row(row[3..].to_vec());
        }
        groups
    }

    /// Distinct tables in sorted order
    pub fn tables(&self) -> Vec<TableRef> {
        self.grouped().into_keys().collect()
    }

    /// All rows sorted by `(database, schema, table, column_name)`, the
    /// overview sheet layout.
    pub fn sorted_overview(&self) -> Grid {
        let mut overview = self.rows.clone();
        overview.rows.sort_by(|a, b| {
            let key = |row: &Vec<Option<String>>| {
                (0..4)
                    .map(|i| row.get(i).cloned().flatten().unwrap_or_default())
                    .collect::<Vec<_>>()
            };
            key(a).cmp(&key(b))
        });
        overview
    }

    /// Definition rows and samples restricted to the given fully qualified
    /// table names. Failure bookkeeping is carried over unchanged.
    pub fn filtered(&self, keep: &[String]) -> TableDefinitions {
        let keep: std::collections::HashSet<&str> = keep.iter().map(String::as_str).collect();

        let mut subset = TableDefinitions::new();
        for row in &self.rows.rows {
            let fqn = format!(
                "{}.{}.{}",
                row.first().cloned().flatten().unwrap_or_default(),
                row.get(1).cloned().flatten().unwrap_or_default(),
                row.get(2).cloned().flatten().unwrap_or_default()
            );
            if keep.contains(fqn.as_str()) {
                subset.rows.push_row(row.clone());
            }
        }
        subset.samples = self
            .samples
            .iter()
            .filter(|sample| keep.contains(sample.table.fqn().as_str()))
            .cloned()
            .collect();
        subset.failures = self.failures.clone();
        subset.excluded = self.excluded.clone();
        subset.skipped = self.skipped.clone();
        subset
    }
}
