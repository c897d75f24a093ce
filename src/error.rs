use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The loaded table has no rows; callers should stop before filtering.
    #[error("no data loaded: the table has zero rows")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid JSON records: {0}")]
    InvalidJsonRecords(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("narrative generator error: {0}")]
    Narrative(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
