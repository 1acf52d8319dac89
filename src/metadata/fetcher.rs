use crate::book::Book;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The service answered but knows no book for the ISBN.
    #[error("No book data available for ISBN '{0}'")]
    NotFound(String),

    /// Transport failure, timeout or unexpected status.
    #[error("Lookup service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something that is not the expected JSON.
    #[error("Malformed lookup response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Unavailable(err.to_string())
        }
    }
}

/// Resolves a book from its ISBN.
///
/// Callers treat every error as "not found"; the variants only matter for logs.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, isbn: &str) -> Result<Book, FetchError>;
}
