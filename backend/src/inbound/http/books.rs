//! Book inventory HTTP handlers.
//!
//! ```text
//! GET    /api/v1/books
//! GET    /api/v1/books/{id}
//! POST   /api/v1/books {"title":"Dune","author":"Frank Herbert","genre":"Sci-Fi"}
//! DELETE /api/v1/books/{id}
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Book, BookId, BookValidationError, Error, NewBook};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Book as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    /// Database identifier.
    #[schema(example = 7)]
    pub id: i32,
    /// Book title.
    #[schema(example = "Dune")]
    pub title: String,
    /// Book author.
    #[schema(example = "Frank Herbert")]
    pub author: String,
    /// Genre, `Unknown` when none was given.
    #[schema(example = "Sci-Fi")]
    pub genre: String,
    /// When the book entered inventory.
    #[schema(format = "date-time")]
    pub added_to_inventory: DateTime<Utc>,
}

impl From<Book> for BookDetails {
    fn from(value: Book) -> Self {
        Self {
            id: value.id.get(),
            title: value.title,
            author: value.author,
            genre: value.genre,
            added_to_inventory: value.added_to_inventory,
        }
    }
}

/// Envelope for `GET /api/v1/books`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookListResponse {
    /// Books in inventory, ordered by id.
    pub data: Vec<BookDetails>,
}

/// Request body for `POST /api/v1/books`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBookRequest {
    /// Title, 1 to 200 characters.
    pub title: String,
    /// Author, 1 to 200 characters.
    pub author: String,
    /// Defaults to `Unknown` when omitted or blank.
    pub genre: Option<String>,
}

fn map_book_validation_error(err: BookValidationError) -> Error {
    let (field, code) = match &err {
        BookValidationError::NonPositiveId => ("id", "non_positive_id"),
        BookValidationError::EmptyTitle => ("title", "empty_title"),
        BookValidationError::EmptyAuthor => ("author", "empty_author"),
        BookValidationError::TooLong { field, .. } => (*field, "too_long"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn parse_book_id(raw: i32) -> Result<BookId, Error> {
    BookId::new(raw).map_err(map_book_validation_error)
}

/// List books currently in inventory.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    responses(
        (status = 200, description = "Books in inventory", body = BookListResponse),
        (status = 503, description = "Book store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listBooks"
)]
#[get("/books")]
pub async fn list_books(state: web::Data<HttpState>) -> ApiResult<web::Json<BookListResponse>> {
    let books = state.books.list_books().await?;
    Ok(web::Json(BookListResponse {
        data: books.into_iter().map(BookDetails::from).collect(),
    }))
}

/// Fetch one book.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = i32, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book", body = BookDetails),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "No such book in inventory", body = ErrorSchema),
        (status = 503, description = "Book store unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBook"
)]
#[get("/books/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<BookDetails>> {
    let id = parse_book_id(path.into_inner())?;
    let book = state
        .books
        .find_book(id)
        .await?
        .ok_or_else(|| Error::not_found(format!("book {id} is not in inventory")))?;
    Ok(web::Json(BookDetails::from(book)))
}

/// Add a book, stamped with the current time.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = AddBookRequest,
    responses(
        (
            status = 201,
            description = "Book added",
            body = BookDetails,
            headers(("Location" = String, description = "URL of the new book"))
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Book store unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "addBook"
)]
#[post("/books")]
pub async fn add_book(
    state: web::Data<HttpState>,
    payload: web::Json<AddBookRequest>,
) -> ApiResult<HttpResponse> {
    let AddBookRequest {
        title,
        author,
        genre,
    } = payload.into_inner();
    let draft =
        NewBook::try_new(&title, &author, genre.as_deref()).map_err(map_book_validation_error)?;
    let book = state
        .book_commands
        .add_book(&draft, state.clock.utc())
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/v1/books/{}", book.id)))
        .json(BookDetails::from(book)))
}

/// Take a book out of inventory. Succeeds whether or not it was present.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = i32, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book no longer in inventory"),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 503, description = "Book store unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "removeBook"
)]
#[delete("/books/{id}")]
pub async fn remove_book(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = parse_book_id(path.into_inner())?;
    let removed = state.book_commands.remove_book(id).await?;
    tracing::debug!(%id, removed, "book removal processed");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
