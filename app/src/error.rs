//! FILENAME: app/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("no data source configured (set --source or COST_ABC_SOURCE)")]
    MissingSource,

    #[error("data source not found: {0}")]
    SourceNotFound(String),

    #[error("{0}")]
    Persistence(#[from] persistence::PersistenceError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("background task failed: {0}")]
    Task(String),
}
