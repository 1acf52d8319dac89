mod error;
mod in_memory;
mod json_file;
mod store;
mod trait_def;

pub use error::{CatalogError, CatalogResult};
pub use in_memory::InMemoryBookPersistence;
pub use json_file::{JsonFileBookPersistence, DEFAULT_DATA_FILE_NAME};
pub use store::{AuthorCount, CatalogStats, CatalogStore, TOP_AUTHORS_LIMIT};
pub use trait_def::BookPersistence;
