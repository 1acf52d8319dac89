//! Book catalog server library.
//!
//! Exposes the store, the metadata lookup and the HTTP layer to both binaries
//! and to the end-to-end tests.

pub mod book;
pub mod catalog_store;
pub mod config;
pub mod metadata;
pub mod server;

pub use book::{Book, BookUpdate};
pub use catalog_store::{CatalogStore, JsonFileBookPersistence};
pub use metadata::{MetadataFetcher, OpenLibraryClient};
pub use server::{make_app, run_server, RequestsLoggingLevel};
