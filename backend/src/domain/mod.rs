//! Domain primitives, services, and ports.
//!
//! Purpose: keep the inventory and on-call rules independent of HTTP, Redis,
//! and PostgreSQL. Adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-neutral failure payload.
//! - Book / NewBook / BookId: inventory records.
//! - OnCallRoster / OnCallDeveloper / ShiftWindow: on-call snapshots.
//! - CachedOnCallLookup: read-through roster lookup.
//! - CachePrimer: background cache refresh.
//! - OnCallServerStatus: status report for operators.

pub mod book;
pub mod cache_primer;
pub mod cached_on_call_lookup;
mod deadline;
pub mod error;
pub mod on_call;
pub mod ports;
pub mod server_status_service;
pub mod trace_id;

#[cfg(test)]
pub(crate) mod test_rosters;

pub use self::book::{
    BOOK_TEXT_MAX, Book, BookId, BookValidationError, NewBook, UNKNOWN_GENRE,
};
pub use self::cache_primer::{
    CachePrimer, CachePrimerConfig, CachePrimerHandle, PrimeCycleReport, PrimerState,
    RefreshTrigger,
};
pub use self::cached_on_call_lookup::{CachedOnCallLookup, OnCallLookupConfig};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::on_call::{
    DeveloperId, OnCallDeveloper, OnCallRoster, OnCallValidationError, ShiftWindow,
};
pub use self::server_status_service::OnCallServerStatus;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use library_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such book"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
