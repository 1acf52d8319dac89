//! In-memory persistence, used by tests and by ephemeral catalogs.

use super::trait_def::BookPersistence;
use crate::book::Book;
use anyhow::{bail, Result};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, MutexGuard, PoisonError,
};

#[derive(Default)]
pub struct InMemoryBookPersistence {
    books: Mutex<Vec<Book>>,
    saves_count: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryBookPersistence {
    pub fn with_books(books: Vec<Book>) -> InMemoryBookPersistence {
        InMemoryBookPersistence {
            books: Mutex::new(books),
            ..Default::default()
        }
    }

    /// Makes every following `save` fail, to exercise the best-effort policy.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn saves_count(&self) -> usize {
        self.saves_count.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Book> {
        self.books().clone()
    }

    fn books(&self) -> MutexGuard<'_, Vec<Book>> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookPersistence for InMemoryBookPersistence {
    fn load(&self) -> Result<Vec<Book>> {
        Ok(self.books().clone())
    }

    fn save(&self, books: &[Book]) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("In-memory persistence set to fail");
        }
        *self.books() = books.to_vec();
        self.saves_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

impl BookPersistence for std::sync::Arc<InMemoryBookPersistence> {
    fn load(&self) -> Result<Vec<Book>> {
        self.as_ref().load()
    }

    fn save(&self, books: &[Book]) -> Result<()> {
        self.as_ref().save(books)
    }

    fn describe(&self) -> String {
        self.as_ref().describe()
    }
}
