//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! domain ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::RefreshTrigger;
use crate::domain::ports::{
    BookCommands, BookQuery, CacheKey, OnCallLookup, RosterCache, ServerStatusQuery,
};

/// Port implementations used by the handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Book reads.
    pub books: Arc<dyn BookQuery>,
    /// Book writes.
    pub book_commands: Arc<dyn BookCommands>,
    /// Cached roster lookup.
    pub on_call: Arc<dyn OnCallLookup>,
    /// Status report query.
    pub status: Arc<dyn ServerStatusQuery>,
    /// Cache invalidated by refresh requests.
    pub roster_cache: Arc<dyn RosterCache>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

/// Roster keys the API knows about and the hook that asks the primer for an
/// early refresh.
#[derive(Clone)]
pub struct OnCallRouting {
    default_key: CacheKey,
    primed_keys: Vec<CacheKey>,
    refresh: RefreshTrigger,
}

impl OnCallRouting {
    /// Route on-call requests over `primed_keys`; the first key answers
    /// `GET /api/v1/on-call`. Returns `None` for an empty key list.
    pub fn new(primed_keys: Vec<CacheKey>, refresh: RefreshTrigger) -> Option<Self> {
        let default_key = primed_keys.first()?.clone();
        Some(Self {
            default_key,
            primed_keys,
            refresh,
        })
    }

    /// Key served by `GET /api/v1/on-call`.
    pub fn default_key(&self) -> &CacheKey {
        &self.default_key
    }

    /// Every key the primer keeps warm.
    pub fn primed_keys(&self) -> &[CacheKey] {
        &self.primed_keys
    }

    /// Trigger that wakes the primer.
    pub fn refresh(&self) -> &RefreshTrigger {
        &self.refresh
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Book reads.
    pub books: Arc<dyn BookQuery>,
    /// Book writes.
    pub book_commands: Arc<dyn BookCommands>,
    /// Cached roster lookup.
    pub on_call: Arc<dyn OnCallLookup>,
    /// Status report query.
    pub status: Arc<dyn ServerStatusQuery>,
    /// Cache invalidated by refresh requests.
    pub roster_cache: Arc<dyn RosterCache>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Known roster keys and the refresh trigger.
    pub routing: OnCallRouting,
}

impl HttpState {
    /// Combine the ports with on-call routing.
    pub fn new(ports: HttpStatePorts, routing: OnCallRouting) -> Self {
        let HttpStatePorts {
            books,
            book_commands,
            on_call,
            status,
            roster_cache,
            clock,
        } = ports;
        Self {
            books,
            book_commands,
            on_call,
            status,
            roster_cache,
            clock,
            routing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_rosters::key;

    #[test]
    fn routing_requires_at_least_one_key() {
        assert!(OnCallRouting::new(Vec::new(), RefreshTrigger::new()).is_none());
    }

    #[test]
    fn first_primed_key_is_the_default() {
        let routing = OnCallRouting::new(vec![key("oncall"), key("oncall-db")], RefreshTrigger::new())
            .expect("routing");
        assert_eq!(routing.default_key(), &key("oncall"));
        assert_eq!(routing.primed_keys().len(), 2);
    }
}
