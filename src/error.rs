use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected while assembling a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown document type: {0}")]
    UnknownType(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// A date, amount or quantity that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid tax rate: {0}")]
    InvalidRate(String),
}

/// Layout or backend failure. Aborts the whole render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Rendering backend failed: {0}")]
    Backend(String),
    #[error("Content overflows the page: needs {needed:.1}pt, {available:.1}pt available")]
    PageOverflow { needed: f32, available: f32 },
    #[error("Table is wider than the page: ends at {table_right:.1}pt, content ends at {content_right:.1}pt")]
    TableTooWide { table_right: f32, content_right: f32 },
    #[error("Column {index} has invalid width {width}")]
    InvalidColumn { index: usize, width: f32 },
    #[error("Render task failed: {0}")]
    Join(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
