//! Library inventory API with a cached on-call roster.
//!
//! The domain holds the roster lookup, cache primer, and book rules. Inbound
//! adapters expose them over HTTP; outbound adapters talk to PostgreSQL,
//! Redis, and the on-call directory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
