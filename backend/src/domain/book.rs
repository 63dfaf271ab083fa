//! Book inventory model.
//!
//! Books are owned by the relational store. The domain only validates the
//! fields a caller supplies when adding a book; identifiers and inventory
//! timestamps are assigned by persistence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Genre recorded when a caller leaves it blank.
pub const UNKNOWN_GENRE: &str = "Unknown";
/// Upper bound on title and author length, matching the column width.
pub const BOOK_TEXT_MAX: usize = 200;

/// Validation errors for book identifiers and drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    /// Identifiers are positive integers.
    #[error("book id must be a positive integer")]
    NonPositiveId,
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Author was blank.
    #[error("author must not be empty")]
    EmptyAuthor,
    /// A text field exceeded [`BOOK_TEXT_MAX`] characters.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Primary key of a book row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct BookId(i32);

impl BookId {
    /// Validate a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use library_api::domain::BookId;
    ///
    /// assert_eq!(BookId::new(7).map(|id| id.get()), Ok(7));
    /// assert!(BookId::new(0).is_err());
    /// ```
    pub fn new(raw: i32) -> Result<Self, BookValidationError> {
        if raw <= 0 {
            return Err(BookValidationError::NonPositiveId);
        }
        Ok(Self(raw))
    }

    /// Raw integer value.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for BookId {
    type Error = BookValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BookId> for i32 {
    fn from(value: BookId) -> Self {
        value.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A book currently held in inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Database identifier.
    pub id: BookId,
    /// Title as stored.
    pub title: String,
    /// Author as stored.
    pub author: String,
    /// Genre, `Unknown` when none was given.
    pub genre: String,
    /// When the book was added.
    pub added_to_inventory: DateTime<Utc>,
}

/// Validated input for adding a book.
///
/// Text is trimmed; a blank genre becomes [`UNKNOWN_GENRE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
    genre: String,
}

impl NewBook {
    /// Validate caller-supplied fields.
    ///
    /// # Examples
    /// ```
    /// use library_api::domain::NewBook;
    ///
    /// let book = NewBook::try_new(" Dune ", "Frank Herbert", None).expect("valid");
    /// assert_eq!(book.title(), "Dune");
    /// assert_eq!(book.genre(), "Unknown");
    /// ```
    pub fn try_new(
        title: &str,
        author: &str,
        genre: Option<&str>,
    ) -> Result<Self, BookValidationError> {
        let title = required_text(title, "title", BookValidationError::EmptyTitle)?;
        let author = required_text(author, "author", BookValidationError::EmptyAuthor)?;
        let genre = match genre.map(str::trim) {
            Some(value) if !value.is_empty() => bounded(value, "genre")?.to_owned(),
            _ => UNKNOWN_GENRE.to_owned(),
        };
        Ok(Self {
            title,
            author,
            genre,
        })
    }

    /// Trimmed title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed author.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Genre after defaulting.
    pub fn genre(&self) -> &str {
        &self.genre
    }
}

fn required_text(
    raw: &str,
    field: &'static str,
    empty: BookValidationError,
) -> Result<String, BookValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    Ok(bounded(trimmed, field)?.to_owned())
}

fn bounded<'a>(value: &'a str, field: &'static str) -> Result<&'a str, BookValidationError> {
    if value.chars().count() > BOOK_TEXT_MAX {
        return Err(BookValidationError::TooLong {
            field,
            max: BOOK_TEXT_MAX,
        });
    }
    Ok(value)
}
