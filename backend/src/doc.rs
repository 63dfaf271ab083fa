//! OpenAPI documentation for the REST API.
//!
//! [`ApiDoc`] registers every handler under `crate::inbound::http` together
//! with the schema wrappers for domain types. Swagger UI serves it in debug
//! builds and the `openapi-dump` binary writes it out for tooling.

use crate::inbound::http::books::{AddBookRequest, BookDetails, BookListResponse};
use crate::inbound::http::on_call::{
    OnCallDeveloperBody, OnCallRosterBody, RefreshAccepted, ServerStatusBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        description = "Book inventory and on-call roster service."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::add_book,
        crate::inbound::http::books::remove_book,
        crate::inbound::http::on_call::get_default_roster,
        crate::inbound::http::on_call::get_roster,
        crate::inbound::http::on_call::refresh_rosters,
        crate::inbound::http::on_call::get_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        BookDetails,
        BookListResponse,
        AddBookRequest,
        OnCallDeveloperBody,
        OnCallRosterBody,
        ServerStatusBody,
        RefreshAccepted,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "books", description = "Book inventory"),
        (name = "on-call", description = "On-call rosters served from cache"),
        (name = "status", description = "Operator status report"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
/// OpenAPI document for the public HTTP surface.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(doc: &utoipa::openapi::OpenApi, name: &str) -> Vec<String> {
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).unwrap_or_else(|| panic!("{name} schema")) {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("crate.domain.Error", &["code", "message", "traceId"])]
    #[case("BookDetails", &["id", "title", "author", "genre", "addedToInventory"])]
    #[case("OnCallDeveloperBody", &["id", "name", "contact", "shiftStart", "shiftEnd"])]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let found = object_fields(&ApiDoc::openapi(), name);
        for field in fields {
            assert!(found.iter().any(|f| f == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/books")]
    #[case("/api/v1/books/{id}")]
    #[case("/api/v1/on-call")]
    #[case("/api/v1/on-call/{key}")]
    #[case("/api/v1/on-call/refresh")]
    #[case("/api/v1/status")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }
}
