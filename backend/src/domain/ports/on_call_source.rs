//! Port for the authoritative on-call directory.
use async_trait::async_trait;

use super::{CacheKey, define_port_error};
use crate::domain::OnCallRoster;

define_port_error! {
    /// Failures reported by the source of truth. Callers treat every variant
    /// as "source unavailable".
    pub enum OnCallSourceError {
        /// Directory unreachable or answered with a server error.
        Unavailable { message: String } => "on-call directory unavailable: {message}",
        /// Directory did not answer in time.
        Timeout { message: String } => "on-call directory timed out: {message}",
        /// Directory answered with a payload that does not describe a roster.
        Decode { message: String } => "on-call directory payload invalid: {message}",
        /// Directory has no roster under the requested key.
        NotFound { key: String } => "on-call directory has no roster for {key}",
    }
}

/// Fetches rosters from the source of truth.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OnCallSource: Send + Sync {
    /// Retrieve the current roster for `key`.
    async fn fetch(&self, key: &CacheKey) -> Result<OnCallRoster, OnCallSourceError>;
}
