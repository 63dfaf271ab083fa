//! Driving port for reading on-call rosters.
use async_trait::async_trait;

use super::{CacheKey, define_port_error};
use crate::domain::{Error, OnCallRoster};

define_port_error! {
    /// Raised when no roster, fresh or stale, can be produced.
    pub enum OnCallLookupError {
        LookupFailed { key: String, message: String } =>
            "on-call lookup for {key} failed: {message}",
    }
}

impl From<OnCallLookupError> for Error {
    fn from(value: OnCallLookupError) -> Self {
        match value {
            OnCallLookupError::LookupFailed { key, .. } => {
                Error::service_unavailable(format!("on-call roster {key} is temporarily unavailable"))
            }
        }
    }
}

/// Resolves the on-call roster for a key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OnCallLookup: Send + Sync {
    /// Return the roster for `key`, from cache when possible.
    async fn resolve(&self, key: &CacheKey) -> Result<OnCallRoster, OnCallLookupError>;
}
