//! Reqwest-backed on-call directory adapter.
//!
//! Owns transport details only: URL construction, timeout and status mapping,
//! and JSON decoding into domain rosters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::RosterResponseDto;
use crate::domain::OnCallRoster;
use crate::domain::ports::{CacheKey, OnCallSource, OnCallSourceError};

const DEFAULT_USER_AGENT: &str = "library-api-oncall/0.1";

/// Outbound identity for directory requests.
pub struct DirectoryHttpIdentity {
    /// `User-Agent` header sent with each request.
    pub user_agent: String,
}

impl Default for DirectoryHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Directory adapter issuing `GET {base}/rosters/{key}`.
pub struct HttpOnCallDirectory {
    client: Client,
    base_url: Url,
    user_agent: String,
    clock: Arc<dyn Clock>,
}

impl HttpOnCallDirectory {
    /// Build an adapter whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        Self::with_identity(base_url, timeout, clock, DirectoryHttpIdentity::default())
    }

    /// Build an adapter with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base_url: Url,
        timeout: Duration,
        clock: Arc<dyn Clock>,
        identity: DirectoryHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            user_agent: identity.user_agent,
            clock,
        })
    }
}

#[async_trait]
impl OnCallSource for HttpOnCallDirectory {
    async fn fetch(&self, key: &CacheKey) -> Result<OnCallRoster, OnCallSourceError> {
        let url = roster_url(&self.base_url, key)?;
        debug!(%key, %url, "fetching roster from directory");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(key, status, body.as_ref()));
        }

        parse_roster(body.as_ref(), self.clock.utc())
    }
}

fn roster_url(base: &Url, key: &CacheKey) -> Result<Url, OnCallSourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| {
            OnCallSourceError::unavailable(format!("directory URL {base} cannot carry a path"))
        })?
        .pop_if_empty()
        .push("rosters")
        .push(key.as_str());
    Ok(url)
}

fn parse_roster(
    body: &[u8],
    fetched_at: chrono::DateTime<chrono::Utc>,
) -> Result<OnCallRoster, OnCallSourceError> {
    let decoded: RosterResponseDto = serde_json::from_slice(body).map_err(|error| {
        OnCallSourceError::decode(format!("invalid roster JSON payload: {error}"))
    })?;
    decoded
        .into_domain_roster(fetched_at)
        .map_err(OnCallSourceError::decode)
}

fn map_transport_error(error: reqwest::Error) -> OnCallSourceError {
    if error.is_timeout() {
        OnCallSourceError::timeout(error.to_string())
    } else {
        OnCallSourceError::unavailable(error.to_string())
    }
}

fn map_status_error(key: &CacheKey, status: StatusCode, body: &[u8]) -> OnCallSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::NOT_FOUND => OnCallSourceError::not_found(key.as_str()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            OnCallSourceError::timeout(message)
        }
        _ => OnCallSourceError::unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
