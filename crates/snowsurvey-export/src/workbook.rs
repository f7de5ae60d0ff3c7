//! Workbook assembly
//!
//! Three workbook layouts, one per pipeline:
//! - parameters: one sheet per scope label, bold header row written
//!   separately from the data rows, fixed positional column widths
//! - definitions: an overview sheet sorted by table and column, then one
//!   sheet per table with the five definition columns
//! - grants: one sheet per object label, with per-sheet failure isolation

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use snowsurvey_harvest::{HarvestResult, TableDefinitions};
use snowsurvey_core::Grid;

use crate::sheet::SheetNamer;

/// Workbook-level assembly failure
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("workbook assembly failed: {0}")]
    Workbook(#[from] XlsxError),
}

/// A sheet that could not be written; the workbook was produced without it
#[derive(Debug, Clone)]
pub struct SheetWarning {
    pub sheet: String,
    pub message: String,
}

/// Workbook bytes plus any per-sheet warnings
#[derive(Debug)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub warnings: Vec<SheetWarning>,
}

/// Positional column widths of a parameter sheet
pub const PARAMETER_COLUMN_WIDTHS: [f64; 6] = [50.0, 20.0, 30.0, 10.0, 80.0, 10.0];

/// Bilingual display caption for a parameter column.
///
/// Presentation only; the underlying column identity is unchanged.
fn parameter_caption(column: &str) -> &str {
    match column {
        "key" => "key / キー",
        "value" => "value / 値",
        "default" => "default / デフォルト",
        "level" => "level / レベル",
        "description" => "description / 説明",
        "type" => "type / タイプ",
        other => other,
    }
}

/// Build the combined-parameters workbook: one sheet per (scope, target)
/// label in harvest order.
pub fn parameters_workbook(result: &HarvestResult) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();
    let bold = Format::new().set_bold();

    for entry in &result.entries {
        let name = namer.assign(&entry.label);
        let sheet = workbook.add_worksheet().set_name(&name)?;

        // Row 0 is the caption row, written apart from the data that starts
        // at row 1.
        for (col, column) in entry.grid.columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, parameter_caption(column), &bold)?;
        }
        write_rows(sheet, &entry.grid, 1)?;

        for (col, width) in PARAMETER_COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Build the full definitions workbook: overview plus one sheet per table.
pub fn definitions_workbook(defs: &TableDefinitions) -> Result<Vec<u8>, ExportError> {
    definitions_workbook_inner(defs, "All_Tables_Overview")
}

/// Build a definitions workbook restricted to the given fully qualified
/// table names.
pub fn selected_definitions_workbook(
    defs: &TableDefinitions,
    keep: &[String],
) -> Result<Vec<u8>, ExportError> {
    definitions_workbook_inner(&defs.filtered(keep), "Selected_Tables_Overview")
}

fn definitions_workbook_inner(
    defs: &TableDefinitions,
    overview_name: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();

    let overview_sheet_name = namer.assign(overview_name);
    let sheet = workbook.add_worksheet().set_name(&overview_sheet_name)?;
    write_grid(sheet, &defs.sorted_overview())?;

    for (table, grid) in defs.grouped() {
        let name = namer.assign(&table.table);
        let sheet = workbook.add_worksheet().set_name(&name)?;
        write_grid(sheet, &grid)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Build the grants workbook: one sheet per object label.
///
/// A sheet that fails to write is dropped with a warning; the remaining
/// sheets are still produced.
pub fn grants_workbook(result: &HarvestResult) -> Result<ExportOutcome, ExportError> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();
    let mut warnings = Vec::new();

    for entry in &result.entries {
        let name = namer.assign(&entry.label);
        if let Err(error) = write_grant_sheet(&mut workbook, &name, &entry.grid) {
            tracing::warn!(sheet = %name, %error, "sheet write failed, dropped from workbook");
            warnings.push(SheetWarning {
                sheet: name,
                message: error.to_string(),
            });
        }
    }

    Ok(ExportOutcome {
        bytes: workbook.save_to_buffer()?,
        warnings,
    })
}

fn write_grant_sheet(workbook: &mut Workbook, name: &str, grid: &Grid) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet().set_name(name)?;
    write_grid(sheet, grid)?;
    Ok(())
}

/// Header at row 0, data from row 1.
fn write_grid(sheet: &mut Worksheet, grid: &Grid) -> Result<(), XlsxError> {
    for (col, column) in grid.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, column)?;
    }
    write_rows(sheet, grid, 1)
}

fn write_rows(sheet: &mut Worksheet, grid: &Grid, start_row: u32) -> Result<(), XlsxError> {
    for (r, row) in grid.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                sheet.write_string(start_row + r as u32, c as u16, value)?;
            }
        }
    }
    Ok(())
}
