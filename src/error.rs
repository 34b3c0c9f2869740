use queries::StoreError;
use thiserror::Error;

/// Error kinds surfaced by the services. Existence-driven reads never use
/// these; they answer with booleans or empty collections instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("duplicate primary key")]
    ConstraintViolation,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("storage failure: {0}")]
    StorageFailure(#[from] std::io::Error),
    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation => Error::ConstraintViolation,
            StoreError::Database(err) => Error::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
