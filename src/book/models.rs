use serde::{Deserialize, Serialize};
use std::fmt;

/// Strips hyphens and spaces, the form used as the catalog identity key.
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

/// A single cataloged book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl Book {
    pub fn new<T, A, I>(title: T, author: A, isbn: I) -> Book
    where
        T: Into<String>,
        A: Into<String>,
        I: Into<String>,
    {
        Book {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }

    pub fn normalized_isbn(&self) -> String {
        normalize_isbn(&self.isbn)
    }

    pub fn has_isbn(&self, normalized_isbn: &str) -> bool {
        self.normalized_isbn() == normalized_isbn
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} (ISBN: {})", self.title, self.author, self.isbn)
    }
}

/// Partial update of a book, `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl BookUpdate {
    /// Trimmed value of a field, blank values count as not supplied.
    pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
