use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Experiment not found: {0}")]
    NotFound(String),

    #[error("Invalid experiment id: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
