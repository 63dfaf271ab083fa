//! Status report naming the developer to contact about incidents.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::Error;
use crate::domain::ports::{CacheKey, OnCallLookup, ServerStatus, ServerStatusQuery};

/// [`ServerStatusQuery`] backed by the on-call lookup.
#[derive(Clone)]
pub struct OnCallServerStatus {
    lookup: Arc<dyn OnCallLookup>,
    clock: Arc<dyn Clock>,
    roster_key: CacheKey,
}

impl OnCallServerStatus {
    /// Report on `roster_key` as seen through `lookup` at `clock` time.
    pub fn new(lookup: Arc<dyn OnCallLookup>, clock: Arc<dyn Clock>, roster_key: CacheKey) -> Self {
        Self {
            lookup,
            clock,
            roster_key,
        }
    }
}

#[async_trait]
impl ServerStatusQuery for OnCallServerStatus {
    async fn status(&self) -> Result<ServerStatus, Error> {
        let roster = self.lookup.resolve(&self.roster_key).await?;
        let checked_at = self.clock.utc();
        let on_call = roster
            .on_shift_at(checked_at)
            .or_else(|| roster.developers().first())
            .cloned();
        let message = match &on_call {
            Some(developer) => format!(
                "Server is running. On-call developer: {} ({})",
                developer.name(),
                developer.contact()
            ),
            None => "Server is running. No on-call developer is listed.".to_owned(),
        };
        Ok(ServerStatus {
            message,
            checked_at,
            on_call,
        })
    }
}
