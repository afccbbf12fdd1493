//! Common error types for galleryinfo

use thiserror::Error;

use crate::validation::ValidationError;

/// Common result type for galleryinfo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by repositories, the importer and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// One or more field checks failed; callers convert through
    /// `ValidationError::into_result`, which only errs when non-empty
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed date text, date range JSON or gallery descriptor
    #[error("Parse error: {0}")]
    Parse(String),

    /// Import feed has no header row or no data rows
    #[error("No content")]
    NoContent,

    /// Malformed CSV feed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the store rejected a write because the identity already exists
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
