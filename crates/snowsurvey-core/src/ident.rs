//! Identifier safety
//!
//! Object names come back from `SHOW` listings and go straight into the text
//! of the next statement, so they are validated first and always embedded in
//! double-quoted form with embedded quotes doubled. Names that cannot be made
//! safe are rejected up front and reported as excluded, never silently
//! dropped and never sent to the warehouse.

use crate::target::TableRef;

/// Why a name was rejected for interpolation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier contains control characters")]
    ControlCharacter,
}

/// Validate a name for safe interpolation.
pub fn check_ident(name: &str) -> Result<(), IdentError> {
    if name.is_empty() {
        return Err(IdentError::Empty);
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(IdentError::ControlCharacter);
    }
    Ok(())
}

/// Quote a validated name: wrap in double quotes, double embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote all three parts of a table reference.
pub fn quote_table(table: &TableRef) -> String {
    format!(
        "{}.{}.{}",
        quote_ident(&table.database),
        quote_ident(&table.schema),
        quote_ident(&table.table)
    )
}
