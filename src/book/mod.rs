mod models;

pub use models::{normalize_isbn, Book, BookUpdate};
