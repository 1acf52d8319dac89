use thiserror::Error;

/// Failures of catalog operations, mapped to status codes only by the handlers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Book with ISBN {0} not found")]
    NotFound(String),

    #[error("Book with ISBN {0} already exists")]
    Conflict(String),

    #[error("Field '{field}' is required but was empty")]
    Validation { field: &'static str },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
