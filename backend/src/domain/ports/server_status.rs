//! Driving port describing service status to operators.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, OnCallDeveloper};

/// Operator-facing status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    /// Short human-readable summary.
    pub message: String,
    /// When the report was produced.
    pub checked_at: DateTime<Utc>,
    /// Developer to contact about incidents, when the roster names one.
    pub on_call: Option<OnCallDeveloper>,
}

/// Produces the current [`ServerStatus`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerStatusQuery: Send + Sync {
    async fn status(&self) -> Result<ServerStatus, Error>;
}
