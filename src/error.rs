use thiserror::Error;

/// Errors raised by the layers around the estimation engine (dose files,
/// configuration, report output). The engine functions themselves never fail.
#[derive(Error, Debug)]
pub enum PKError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Timestamp parsing error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Invalid dosing history: {0}")]
    InvalidDosing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parameter validation error: {0}")]
    Validation(String),
}

pub type PKResult<T> = Result<T, PKError>;
