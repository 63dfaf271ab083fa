//! On-call roster and status HTTP handlers.
//!
//! ```text
//! GET  /api/v1/on-call
//! GET  /api/v1/on-call/{key}
//! POST /api/v1/on-call/refresh
//! GET  /api/v1/status
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{CacheKey, ServerStatus};
use crate::domain::{Error, OnCallDeveloper, OnCallRoster};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// One developer on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnCallDeveloperBody {
    /// Directory identifier.
    pub id: String,
    /// Display name.
    #[schema(example = "Ana")]
    pub name: String,
    /// How to reach the developer.
    #[schema(example = "ana@example.com")]
    pub contact: String,
    /// Shift start, inclusive.
    #[schema(format = "date-time")]
    pub shift_start: DateTime<Utc>,
    /// Shift end, exclusive.
    #[schema(format = "date-time")]
    pub shift_end: DateTime<Utc>,
}

impl From<&OnCallDeveloper> for OnCallDeveloperBody {
    fn from(value: &OnCallDeveloper) -> Self {
        Self {
            id: value.id().as_str().to_owned(),
            name: value.name().to_owned(),
            contact: value.contact().to_owned(),
            shift_start: value.shift().starts_at(),
            shift_end: value.shift().ends_at(),
        }
    }
}

/// Roster for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnCallRosterBody {
    /// Roster key.
    #[schema(example = "oncall")]
    pub key: String,
    /// When the directory produced the roster.
    #[schema(format = "date-time")]
    pub fetched_at: DateTime<Utc>,
    /// Developers in roster order.
    pub developers: Vec<OnCallDeveloperBody>,
}

impl OnCallRosterBody {
    fn new(key: &CacheKey, roster: &OnCallRoster) -> Self {
        Self {
            key: key.as_str().to_owned(),
            fetched_at: roster.fetched_at(),
            developers: roster
                .developers()
                .iter()
                .map(OnCallDeveloperBody::from)
                .collect(),
        }
    }
}

/// Operator status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusBody {
    /// Human-readable summary.
    #[schema(example = "Server is running. On-call developer: Ana (ana@example.com)")]
    pub message: String,
    /// Time the report was made.
    #[schema(format = "date-time")]
    pub checked_at: DateTime<Utc>,
    /// Developer on shift, if any.
    pub on_call: Option<OnCallDeveloperBody>,
}

impl From<ServerStatus> for ServerStatusBody {
    fn from(value: ServerStatus) -> Self {
        Self {
            message: value.message,
            checked_at: value.checked_at,
            on_call: value.on_call.as_ref().map(OnCallDeveloperBody::from),
        }
    }
}

/// Keys whose cache entries were dropped by a refresh request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAccepted {
    /// Keys dropped from the cache.
    pub invalidated: Vec<String>,
}

async fn roster_response(state: &HttpState, key: &CacheKey) -> ApiResult<HttpResponse> {
    let roster = state.on_call.resolve(key).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(OnCallRosterBody::new(key, &roster)))
}

/// Roster for the default key.
#[utoipa::path(
    get,
    path = "/api/v1/on-call",
    responses(
        (status = 200, description = "Current roster", body = OnCallRosterBody),
        (status = 503, description = "Roster unavailable", body = ErrorSchema)
    ),
    tags = ["on-call"],
    operation_id = "getDefaultRoster"
)]
#[get("/on-call")]
pub async fn get_default_roster(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    roster_response(&state, state.routing.default_key()).await
}

/// Roster for a named key.
#[utoipa::path(
    get,
    path = "/api/v1/on-call/{key}",
    params(("key" = String, Path, description = "Roster key")),
    responses(
        (status = 200, description = "Current roster", body = OnCallRosterBody),
        (status = 400, description = "Invalid key", body = ErrorSchema),
        (status = 503, description = "Roster unavailable", body = ErrorSchema)
    ),
    tags = ["on-call"],
    operation_id = "getRoster"
)]
#[get("/on-call/{key}")]
pub async fn get_roster(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let key = CacheKey::new(path.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "key" }))
    })?;
    roster_response(&state, &key).await
}

/// Drop cached rosters and ask the primer to refresh them.
///
/// Invalidation failures are logged; the refresh request is always made.
#[utoipa::path(
    post,
    path = "/api/v1/on-call/refresh",
    responses(
        (status = 202, description = "Refresh scheduled", body = RefreshAccepted)
    ),
    tags = ["on-call"],
    operation_id = "refreshRosters"
)]
#[post("/on-call/refresh")]
pub async fn refresh_rosters(state: web::Data<HttpState>) -> HttpResponse {
    let mut invalidated = Vec::new();
    for key in state.routing.primed_keys() {
        match state.roster_cache.invalidate(key).await {
            Ok(()) => invalidated.push(key.as_str().to_owned()),
            Err(error) => warn!(%key, %error, "failed to invalidate cached roster"),
        }
    }
    state.routing.refresh().request();
    info!(count = invalidated.len(), "roster refresh requested");
    HttpResponse::Accepted().json(RefreshAccepted { invalidated })
}

/// Service status naming the developer to contact.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Status report", body = ServerStatusBody),
        (status = 503, description = "Roster unavailable", body = ErrorSchema)
    ),
    tags = ["status"],
    operation_id = "getStatus"
)]
#[get("/status")]
pub async fn get_status(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let status = state.status.status().await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(ServerStatusBody::from(status)))
}

#[cfg(test)]
#[path = "on_call_tests.rs"]
mod tests;
