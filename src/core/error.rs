use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RowblockError {
    #[error("Truncated input: need {needed} bytes at position {position}, block has {len}")]
    TruncatedInput {
        position: usize,
        needed: usize,
        len: usize,
    },
    #[error("Malformed length {length} at position {position}")]
    MalformedLength { position: usize, length: i64 },
    #[error("Unsupported type for column '{column}': {declared}")]
    UnsupportedColumnType { column: String, declared: String },
    #[error("Cannot parse schema: {0}")]
    SchemaParsingError(String),
    #[error("Column not materialized: {0}")]
    NotMaterialized(String),
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Arrow error: {0}")]
    ArrowError(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
}

impl From<std::io::Error> for RowblockError {
    fn from(err: std::io::Error) -> Self {
        RowblockError::IoError(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for RowblockError {
    fn from(err: arrow::error::ArrowError) -> Self {
        RowblockError::ArrowError(err.to_string())
    }
}
