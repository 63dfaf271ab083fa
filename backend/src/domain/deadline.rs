//! Time budget applied to every cache and source call.

use std::future::Future;
use std::time::Duration;

/// Await `operation` for at most `limit`, converting an elapsed budget into
/// the caller's error type.
pub(crate) async fn within<T, E, Fut>(
    limit: Duration,
    operation: Fut,
    on_elapsed: impl FnOnce() -> E,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .unwrap_or_else(|_| Err(on_elapsed()))
}
