use thiserror::Error;

/// Errors that can occur during dataset operations
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Invalid dimensions: expected {expected}, got {actual}")]
    InvalidDimensions { expected: usize, actual: usize },

    #[error("Headers needed: {0}")]
    HeadersNeeded(String),

    #[error("Invalid dataset index: column {index} (dataset has {width} columns)")]
    InvalidDatasetIndex { index: usize, width: usize },

    #[error("Invalid dataset type: {0}")]
    InvalidDatasetType(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Format already registered: {0}")]
    DuplicateFormat(String),

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Index out of bounds: {index} (length {len})")]
    IndexOutOfBounds { index: isize, len: usize },

    #[error("Slice step cannot be zero")]
    ZeroSliceStep,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid UTF-8 input: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub(crate) fn out_of_bounds(index: usize, len: usize) -> Self {
        DatasetError::IndexOutOfBounds {
            index: index as isize,
            len,
        }
    }

    pub(crate) fn unsupported(format: &str, what: &str) -> Self {
        DatasetError::UnsupportedFormat(format!("'{format}' does not support {what}"))
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
