use thiserror::Error;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Split parts total {actual:.2} but the transaction amount is {expected:.2}")]
    SplitMismatch { expected: f64, actual: f64 },

    #[error("A split needs at least one part")]
    EmptySplit,

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, LensError>;
