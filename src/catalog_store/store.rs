//! The catalog store: an ordered, in-memory list of books that owns its
//! persistence backend.
//!
//! Lookups are linear scans keyed by normalized ISBN. Every mutation rewrites
//! the whole snapshot through the injected [`BookPersistence`]; a failed write
//! is logged and otherwise ignored, the in-memory list stays authoritative.

use super::error::{CatalogError, CatalogResult};
use super::in_memory::InMemoryBookPersistence;
use super::trait_def::BookPersistence;
use crate::book::{normalize_isbn, Book, BookUpdate};
use serde::Serialize;
use tracing::{debug, error, info, warn};

pub const TOP_AUTHORS_LIMIT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_books: usize,
    pub unique_authors: usize,
    /// Distinct authors in order of first appearance.
    pub authors: Vec<String>,
    /// Authors with the most books, at most [`TOP_AUTHORS_LIMIT`] entries.
    pub top_authors: Vec<AuthorCount>,
}

pub struct CatalogStore {
    books: Vec<Book>,
    persistence: Box<dyn BookPersistence>,
}

impl CatalogStore {
    /// Builds a store from whatever the backend holds. Unreadable or malformed
    /// snapshots start an empty catalog.
    pub fn load(persistence: Box<dyn BookPersistence>) -> CatalogStore {
        let books = match persistence.load() {
            Ok(books) => books,
            Err(err) => {
                warn!(
                    "Could not load catalog from {}, starting empty: {:#}",
                    persistence.describe(),
                    err
                );
                vec![]
            }
        };
        info!(
            "Loaded {} books from {}",
            books.len(),
            persistence.describe()
        );
        CatalogStore { books, persistence }
    }

    pub fn in_memory() -> CatalogStore {
        CatalogStore::load(Box::new(InMemoryBookPersistence::default()))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn location(&self) -> String {
        self.persistence.describe()
    }

    fn position(&self, normalized_isbn: &str) -> Option<usize> {
        self.books.iter().position(|b| b.has_isbn(normalized_isbn))
    }

    pub fn contains(&self, isbn: &str) -> bool {
        self.find(isbn).is_some()
    }

    pub fn find(&self, isbn: &str) -> Option<&Book> {
        let isbn = normalize_isbn(isbn.trim());
        self.position(&isbn).map(|i| &self.books[i])
    }

    /// Appends a book, storing its ISBN in normalized form.
    pub fn add(&mut self, book: Book) -> CatalogResult<Book> {
        let book = Book {
            title: book.title.trim().to_string(),
            author: book.author.trim().to_string(),
            isbn: normalize_isbn(book.isbn.trim()),
        };
        if book.title.is_empty() {
            return Err(CatalogError::Validation { field: "title" });
        }
        if book.author.is_empty() {
            return Err(CatalogError::Validation { field: "author" });
        }
        if book.isbn.is_empty() {
            return Err(CatalogError::Validation { field: "isbn" });
        }
        if self.position(&book.isbn).is_some() {
            return Err(CatalogError::Conflict(book.isbn));
        }

        debug!("Adding book {}", book);
        self.books.push(book.clone());
        self.persist();
        Ok(book)
    }

    /// Removes the first book matching `isbn`, returns whether one was removed.
    pub fn remove(&mut self, isbn: &str) -> bool {
        let isbn = normalize_isbn(isbn.trim());
        match self.position(&isbn) {
            Some(index) => {
                let removed = self.books.remove(index);
                debug!("Removed book {}", removed);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Applies the supplied fields of `update` to the book matching `isbn`.
    ///
    /// Moving a book to an ISBN already held by another book is a conflict and
    /// leaves the catalog untouched.
    pub fn update(&mut self, isbn: &str, update: BookUpdate) -> CatalogResult<Book> {
        let isbn = normalize_isbn(isbn.trim());
        let index = self
            .position(&isbn)
            .ok_or_else(|| CatalogError::NotFound(isbn.clone()))?;

        let new_isbn = BookUpdate::supplied(&update.isbn).map(normalize_isbn);
        if let Some(new_isbn) = &new_isbn {
            if new_isbn.is_empty() {
                return Err(CatalogError::Validation { field: "isbn" });
            }
            let collides = self
                .books
                .iter()
                .enumerate()
                .any(|(i, b)| i != index && b.has_isbn(new_isbn));
            if collides {
                return Err(CatalogError::Conflict(new_isbn.clone()));
            }
        }

        let book = &mut self.books[index];
        if let Some(title) = BookUpdate::supplied(&update.title) {
            book.title = title.to_string();
        }
        if let Some(author) = BookUpdate::supplied(&update.author) {
            book.author = author.to_string();
        }
        if let Some(new_isbn) = new_isbn {
            book.isbn = new_isbn;
        }
        let updated = book.clone();

        debug!("Updated book {}", updated);
        self.persist();
        Ok(updated)
    }

    pub fn list(&self) -> Vec<Book> {
        self.books.clone()
    }

    /// Case-insensitive substring match on title, author or ISBN.
    pub fn search(&self, query: &str) -> Vec<Book> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&query)
                    || b.author.to_lowercase().contains(&query)
                    || b.isbn.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Drops every book.
    pub fn clear(&mut self) {
        info!("Clearing {} books", self.books.len());
        self.books.clear();
        self.persist();
    }

    pub fn stats(&self) -> CatalogStats {
        let mut counts: Vec<AuthorCount> = vec![];
        for book in self.books.iter() {
            match counts.iter_mut().find(|c| c.author == book.author) {
                Some(entry) => entry.count += 1,
                None => counts.push(AuthorCount {
                    author: book.author.clone(),
                    count: 1,
                }),
            }
        }

        let authors: Vec<String> = counts.iter().map(|c| c.author.clone()).collect();

        // Stable sort, ties keep first-seen order.
        let mut top_authors = counts;
        top_authors.sort_by(|a, b| b.count.cmp(&a.count));
        top_authors.truncate(TOP_AUTHORS_LIMIT);

        CatalogStats {
            total_books: self.books.len(),
            unique_authors: authors.len(),
            authors,
            top_authors,
        }
    }

    /// Writes the current list through the backend, best effort.
    pub fn persist(&self) {
        if let Err(err) = self.persistence.save(&self.books) {
            error!(
                "Error saving books to {}: {:#}",
                self.persistence.describe(),
                err
            );
        }
    }
}
