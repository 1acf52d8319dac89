//! BookPersistence trait definition.
//!
//! The catalog store keeps its books in memory and hands the whole
//! collection to a persistence backend after every mutation.

use crate::book::Book;
use anyhow::Result;

/// Durable snapshot of the catalog.
///
/// Implementations replace the whole snapshot on every `save`, there is no
/// incremental write and no crash-atomicity guarantee.
pub trait BookPersistence: Send + Sync {
    /// Read the last saved snapshot. A missing snapshot is an empty catalog.
    fn load(&self) -> Result<Vec<Book>>;

    /// Replace the snapshot with `books`.
    fn save(&self, books: &[Book]) -> Result<()>;

    /// Human readable location of the snapshot, for logs and the console.
    fn describe(&self) -> String;
}
