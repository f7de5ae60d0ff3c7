//! Ordered tabular results
//!
//! Every metadata statement returns a `Grid`: ordered column names plus rows
//! of optional string cells. Metadata output is textual at the wire level, so
//! cells are rendered strings; `None` is a SQL NULL.

use serde::{Deserialize, Serialize};

/// A single cell. `None` is NULL.
pub type Cell = Option<String>;

/// An ordered tabular result: column names plus rows.
///
/// A grid with zero rows is a successful, empty result, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Ordered column names
    pub columns: Vec<String>,

    /// Rows, each the same width as `columns`
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create an empty grid with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a grid from columns and rows
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Append a row. Short rows are padded with NULLs to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the grid holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, NULLs rendered as empty strings
    pub fn column_values(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(index).and_then(|c| c.clone()).unwrap_or_default())
            .collect()
    }

    /// Object names from `SHOW …` output.
    ///
    /// `SHOW` statements place the object name in a column called `name`;
    /// connectors that rename it historically kept it in the second column.
    pub fn name_values(&self) -> Vec<String> {
        let index = match self.column_index("name") {
            Some(i) => i,
            None if self.columns.len() > 1 => 1,
            None if !self.columns.is_empty() => 0,
            None => return Vec::new(),
        };
        self.column_values(index)
    }

    /// A new grid containing only the given column positions, in that order.
    pub fn select_columns(&self, indices: &[usize]) -> Grid {
        let columns = indices
            .iter()
            .map(|&i| self.columns.get(i).cloned().unwrap_or_default())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row.get(i).cloned().flatten()).collect())
            .collect();
        Grid { columns, rows }
    }

    /// Keep at most `limit` rows.
    pub fn truncated(mut self, limit: usize) -> Grid {
        self.rows.truncate(limit);
        self
    }
}
