//! Translation of pool and Diesel failures into `BookRepositoryError`.

use tracing::debug;

use super::pool::PoolError;
use crate::domain::ports::BookRepositoryError;

pub(super) fn map_pool_error(error: PoolError) -> BookRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    BookRepositoryError::connection(message)
}

/// Database detail is logged at debug level and never reaches the caller.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> BookRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => BookRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            BookRepositoryError::connection("database connection error")
        }
        _ => BookRepositoryError::query("database error"),
    }
}
