//! Tabular export
//!
//! Turns a harvest aggregate into either a downloadable multi-sheet workbook
//! or a renderable preview structure. Sheet names are made collision-safe per
//! workbook; per-sheet write failures degrade to warnings while the rest of
//! the workbook is still produced.

pub mod preview;
pub mod sheet;
pub mod workbook;

pub use preview::{definition_preview, hierarchy_dot, DefinitionPreview, TablePreview};
pub use sheet::SheetNamer;
pub use workbook::{
    definitions_workbook, grants_workbook, parameters_workbook, selected_definitions_workbook,
    ExportError, ExportOutcome, SheetWarning, PARAMETER_COLUMN_WIDTHS,
};
