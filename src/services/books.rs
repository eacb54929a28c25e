//! Bookshelf service: validation rules and book lifecycle

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{generate_book_id, Book, BookPayload, BookQuery, BookShort},
    repository::Repository,
};

pub const MSG_CREATED: &str = "Buku berhasil ditambahkan";
pub const MSG_UPDATED: &str = "Buku berhasil diperbarui";
pub const MSG_DELETED: &str = "Buku berhasil dihapus";

const MSG_CREATE_FAILED: &str = "Buku gagal ditambahkan";
const MSG_NOT_FOUND: &str = "Buku tidak ditemukan";
const MSG_UPDATE_NOT_FOUND: &str = "Gagal memperbarui buku. Id tidak ditemukan";
const MSG_DELETE_NOT_FOUND: &str = "Buku gagal dihapus. Id tidak ditemukan";

/// Write operation a payload is validated for; selects the message wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteAction {
    Create,
    Update,
}

impl WriteAction {
    fn missing_name(self) -> &'static str {
        match self {
            WriteAction::Create => "Gagal menambahkan buku. Mohon isi nama buku",
            WriteAction::Update => "Gagal memperbarui buku. Mohon isi nama buku",
        }
    }

    fn read_page_overflow(self) -> &'static str {
        match self {
            WriteAction::Create => {
                "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
            }
            WriteAction::Update => {
                "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
            }
        }
    }
}

/// Check a payload: name first, then page progress
fn validate_payload(payload: &BookPayload, action: WriteAction) -> AppResult<()> {
    if payload.validate().is_err() {
        tracing::warn!("Rejected book payload: missing name");
        return Err(AppError::Validation(action.missing_name().to_string()));
    }
    if payload.read_page_exceeds_page_count() {
        tracing::warn!(
            "Rejected book payload: readPage {} > pageCount {}",
            payload.read_page,
            payload.page_count
        );
        return Err(AppError::Validation(action.read_page_overflow().to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a book and return its new ID
    pub async fn create(&self, payload: BookPayload) -> AppResult<String> {
        validate_payload(&payload, WriteAction::Create)?;

        let id = generate_book_id();
        let book = Book::new(id.clone(), payload, Utc::now());
        self.repository.books.insert(book).await;

        if !self.repository.books.exists(&id).await {
            return Err(AppError::Internal(MSG_CREATE_FAILED.to_string()));
        }

        tracing::info!("Book created: id={}", id);
        Ok(id)
    }

    /// List books matching the query filters
    pub async fn list(&self, query: &BookQuery) -> Vec<BookShort> {
        let filter = query.to_filter();
        let books = self.repository.books.list(&filter).await;
        tracing::debug!("Book list with {:?} returned {} books", filter, books.len());
        books
    }

    /// Get a book by ID with all fields
    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await.ok_or_else(|| {
            tracing::debug!("Book {} not found", id);
            AppError::NotFound(MSG_NOT_FOUND.to_string())
        })
    }

    /// Replace a book's fields
    pub async fn update(&self, id: &str, payload: &BookPayload) -> AppResult<()> {
        validate_payload(payload, WriteAction::Update)?;

        if !self.repository.books.update(id, payload, Utc::now()).await {
            tracing::warn!("Update of unknown book {}", id);
            return Err(AppError::NotFound(MSG_UPDATE_NOT_FOUND.to_string()));
        }

        tracing::info!("Book updated: id={}", id);
        Ok(())
    }

    /// Delete a book
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.repository.books.delete(id).await {
            tracing::warn!("Delete of unknown book {}", id);
            return Err(AppError::NotFound(MSG_DELETE_NOT_FOUND.to_string()));
        }

        tracing::info!("Book deleted: id={}", id);
        Ok(())
    }

    /// Number of books on the shelf
    pub async fn count(&self) -> usize {
        self.repository.books.count().await
    }
}
