//! Cache-control policies for HTTP responses.

/// Roster and status responses change whenever the directory does.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Header tuple for responses that must be revalidated before reuse.
pub const fn private_no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
