//! On-screen preview structures
//!
//! The preview form of a definitions harvest: a database → schema → table
//! hierarchy graph in Graphviz DOT, plus per-table definition grids and
//! sample rows in stable group order. Serializable, so a front end or
//! `--format json` can render it directly.

use serde::Serialize;
use snowsurvey_core::{Grid, TableRef};
use snowsurvey_harvest::TableDefinitions;
use std::collections::{HashMap, HashSet};

/// Preview of one table
#[derive(Debug, Clone, Serialize)]
pub struct TablePreview {
    pub table: TableRef,

    /// Definition rows in the five fixed columns
    pub definition: Grid,

    /// Sample rows, when the sample fetch succeeded
    pub sample: Option<Grid>,

    /// Sample fetch error, when it did not
    pub sample_error: Option<String>,
}

/// Renderable preview of a definitions harvest
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionPreview {
    /// Graphviz DOT source of the database → schema → table hierarchy
    pub hierarchy_dot: String,

    /// Per-table previews in `(database, schema, table)` order
    pub tables: Vec<TablePreview>,
}

/// Build the preview from grouped definition data.
pub fn definition_preview(defs: &TableDefinitions) -> DefinitionPreview {
    let groups = defs.grouped();

    let mut samples: HashMap<String, &snowsurvey_harvest::TableSample> = HashMap::new();
    for sample in &defs.samples {
        samples.insert(sample.table.fqn(), sample);
    }

    let tables = groups
        .iter()
        .map(|(table, definition)| {
            let (sample, sample_error) = match samples.get(&table.fqn()).map(|s| &s.outcome) {
                Some(Ok(grid)) => (Some(grid.clone()), None),
                Some(Err(error)) => (None, Some(error.to_string())),
                None => (None, None),
            };
            TablePreview {
                table: table.clone(),
                definition: definition.clone(),
                sample,
                sample_error,
            }
        })
        .collect();

    DefinitionPreview {
        hierarchy_dot: hierarchy_dot(groups.keys()),
        tables,
    }
}

/// Render the database → schema → table hierarchy as Graphviz DOT.
///
/// Each edge is emitted at most once regardless of how many tables share a
/// database or schema.
pub fn hierarchy_dot<'a>(tables: impl IntoIterator<Item = &'a TableRef>) -> String {
    let mut lines = vec![
        "digraph G {".to_string(),
        "rankdir=LR;".to_string(),
        "node [shape=box];".to_string(),
    ];

    let mut db_schema_edges = HashSet::new();
    let mut schema_table_edges = HashSet::new();

    for table in tables {
        let db_node = table.database.clone();
        let schema_node = format!("{}.{}", table.database, table.schema);
        let table_node = table.fqn();

        if db_schema_edges.insert((db_node.clone(), schema_node.clone())) {
            lines.push(format!(
                "\"{}\" -> \"{}\"",
                dot_escape(&db_node),
                dot_escape(&schema_node)
            ));
        }
        if schema_table_edges.insert((schema_node.clone(), table_node.clone())) {
            lines.push(format!(
                "\"{}\" -> \"{}\"",
                dot_escape(&schema_node),
                dot_escape(&table_node)
            ));
        }
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn dot_escape(name: &str) -> String {
    name.replace('"', "\\\"")
}
