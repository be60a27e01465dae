//! Read-only book catalog reference.
//!
//! The catalog is an external collaborator from the order system's
//! perspective: orders reference books by id, and reads resolve display
//! fields (title, price) through a batch lookup that tolerates references
//! to books that no longer exist.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{BookId, Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// A catalog book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub trending: bool,
}

/// Errors from the catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog backend could not be reached or answered malformed data.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Read-only access to the book catalog.
///
/// Implementations must be thread-safe. Lookups by id return `None` for
/// unknown references instead of failing; `get_many` simply omits ids it
/// cannot resolve, so a dangling reference never fails a whole read.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Looks up a single book by id.
    async fn get(&self, id: BookId) -> Result<Option<Book>>;

    /// Batch lookup. The returned map contains only the ids that resolved.
    async fn get_many(&self, ids: &[BookId]) -> Result<HashMap<BookId, Book>>;

    /// Total number of catalog entries.
    async fn count(&self) -> Result<u64>;

    /// Number of catalog entries flagged as trending.
    async fn trending_count(&self) -> Result<u64>;
}

/// In-memory catalog, seeded at startup.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    books: Arc<RwLock<HashMap<BookId, Book>>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with the given books.
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let map = books.into_iter().map(|b| (b.id, b)).collect();
        Self {
            books: Arc::new(RwLock::new(map)),
        }
    }

    /// Adds or replaces a book.
    pub async fn insert(&self, book: Book) {
        self.books.write().await.insert(book.id, book);
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn get(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[BookId]) -> Result<HashMap<BookId, Book>> {
        let books = self.books.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| books.get(id).map(|b| (*id, b.clone())))
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.books.read().await.len() as u64)
    }

    async fn trending_count(&self) -> Result<u64> {
        Ok(self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.trending)
            .count() as u64)
    }
}
