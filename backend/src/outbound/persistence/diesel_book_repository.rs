//! PostgreSQL-backed book inventory.
//!
//! Implements both [`BookQuery`] and [`BookCommands`]. Removal is a soft
//! delete: the row stays and `in_inventory` flips to false, so every read
//! filters on that flag.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BookRow, NewBookRow};
use super::pool::DbPool;
use super::schema::books;
use crate::domain::ports::{BookCommands, BookQuery, BookRepositoryError};
use crate::domain::{Book, BookId, NewBook};

/// Diesel implementation of the book ports.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Repository over an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_book(row: BookRow) -> Result<Book, BookRepositoryError> {
    let id = BookId::new(row.id).map_err(|err| {
        BookRepositoryError::query(format!("stored book id {} is invalid: {err}", row.id))
    })?;
    Ok(Book {
        id,
        title: row.title,
        author: row.author,
        genre: row.genre,
        added_to_inventory: row.added_to_inventory,
    })
}

#[async_trait]
impl BookQuery for DieselBookRepository {
    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookRow> = books::table
            .filter(books::in_inventory.eq(true))
            .order(books::id.asc())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_book).collect()
    }

    async fn find_book(&self, id: BookId) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookRow> = books::table
            .filter(books::id.eq(id.get()).and(books::in_inventory.eq(true)))
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_book).transpose()
    }
}

#[async_trait]
impl BookCommands for DieselBookRepository {
    async fn add_book(
        &self,
        book: &NewBook,
        added_at: DateTime<Utc>,
    ) -> Result<Book, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: BookRow = diesel::insert_into(books::table)
            .values(&NewBookRow {
                title: book.title(),
                author: book.author(),
                genre: book.genre(),
                added_to_inventory: added_at,
                in_inventory: true,
            })
            .returning(BookRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_book(row)
    }

    async fn remove_book(&self, id: BookId) -> Result<bool, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            books::table.filter(books::id.eq(id.get()).and(books::in_inventory.eq(true))),
        )
        .set(books::in_inventory.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
