use thiserror::Error;

#[derive(Error, Debug)]
pub enum CohortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("invalid input at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },

    #[error("referential integrity violation: {0}")]
    Integrity(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, CohortError>;
