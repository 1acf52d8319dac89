//! Book metadata lookup from a remote Open Library compatible service.

mod fetcher;
mod open_library;
mod payload;

pub use fetcher::{FetchError, MetadataFetcher};
pub use open_library::{OpenLibraryClient, DEFAULT_LOOKUP_TIMEOUT_SEC, OPEN_LIBRARY_BASE_URL};
pub use payload::{UNKNOWN_AUTHOR, UNKNOWN_TITLE};
