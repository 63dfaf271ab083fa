//! Read and command ports for the book inventory.
//!
//! Both ports are usually served by the same relational adapter but stay
//! separate so handlers depend only on what they use.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{Book, BookId, Error, NewBook};

define_port_error! {
    /// Errors raised by book persistence.
    pub enum BookRepositoryError {
        /// No connection could be checked out or the connection dropped.
        Connection { message: String } => "book store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "book store query failed: {message}",
    }
}

impl From<BookRepositoryError> for Error {
    fn from(value: BookRepositoryError) -> Self {
        match value {
            BookRepositoryError::Connection { message } => Error::service_unavailable(message),
            BookRepositoryError::Query { message } => Error::internal(message),
        }
    }
}

/// Read access to books currently in inventory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookQuery: Send + Sync {
    /// All books in inventory ordered by id.
    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError>;

    /// One book, or `None` when absent or removed from inventory.
    async fn find_book(&self, id: BookId) -> Result<Option<Book>, BookRepositoryError>;
}

/// Inventory mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookCommands: Send + Sync {
    /// Insert a book stamped as added at `added_at`.
    async fn add_book(
        &self,
        book: &NewBook,
        added_at: DateTime<Utc>,
    ) -> Result<Book, BookRepositoryError>;

    /// Take a book out of inventory. Returns whether a book was removed.
    async fn remove_book(&self, id: BookId) -> Result<bool, BookRepositoryError>;
}
