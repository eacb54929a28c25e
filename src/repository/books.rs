//! In-memory book collection

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::book::{Book, BookFilter, BookPayload, BookShort};

/// Ordered book collection shared across request handlers.
///
/// Every operation takes the lock once, so a single mutation is never
/// observed half-applied.
#[derive(Clone, Default)]
pub struct BooksRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a book at the end of the collection
    pub async fn insert(&self, book: Book) {
        self.books.write().await.push(book);
    }

    /// Check whether a book with the given ID is stored
    pub async fn exists(&self, id: &str) -> bool {
        self.books.read().await.iter().any(|book| book.id == id)
    }

    /// List books matching every present filter, in insertion order
    pub async fn list(&self, filter: &BookFilter) -> Vec<BookShort> {
        let books = self.books.read().await;
        books
            .iter()
            .filter(|book| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |name| book.name.to_lowercase().contains(name))
            })
            .filter(|book| filter.finished.map_or(true, |finished| book.finished == finished))
            .filter(|book| filter.reading.map_or(true, |reading| book.reading == reading))
            .map(BookShort::from)
            .collect()
    }

    /// Get a full book record by ID
    pub async fn get_by_id(&self, id: &str) -> Option<Book> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
    }

    /// Replace a book's fields in place. Returns false when the ID is unknown.
    pub async fn update(&self, id: &str, payload: &BookPayload, now: DateTime<Utc>) -> bool {
        let mut books = self.books.write().await;
        match books.iter_mut().find(|book| book.id == id) {
            Some(book) => {
                book.apply(payload, now);
                true
            }
            None => false,
        }
    }

    /// Remove a book, keeping the order of the others. Returns false when the ID is unknown.
    pub async fn delete(&self, id: &str) -> bool {
        let mut books = self.books.write().await;
        match books.iter().position(|book| book.id == id) {
            Some(index) => {
                books.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of stored books
    pub async fn count(&self) -> usize {
        self.books.read().await.len()
    }
}
