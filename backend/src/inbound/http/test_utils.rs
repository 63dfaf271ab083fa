//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use mockable::MockClock;

use crate::domain::RefreshTrigger;
use crate::domain::ports::{
    MockBookCommands, MockBookQuery, MockOnCallLookup, MockRosterCache, MockServerStatusQuery,
};
use crate::domain::test_rosters::key;
use crate::inbound::http::state::{HttpState, HttpStatePorts, OnCallRouting};

/// Mocked ports with no expectations; tests set only what they exercise.
pub(crate) struct TestPorts {
    pub books: MockBookQuery,
    pub book_commands: MockBookCommands,
    pub on_call: MockOnCallLookup,
    pub status: MockServerStatusQuery,
    pub roster_cache: MockRosterCache,
    pub clock: MockClock,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            books: MockBookQuery::new(),
            book_commands: MockBookCommands::new(),
            on_call: MockOnCallLookup::new(),
            status: MockServerStatusQuery::new(),
            roster_cache: MockRosterCache::new(),
            clock: MockClock::new(),
        }
    }
}

impl TestPorts {
    /// Build handler state routing over `keys`; the first key is the default.
    pub(crate) fn into_state(self, keys: &[&str]) -> (web::Data<HttpState>, RefreshTrigger) {
        let refresh = RefreshTrigger::new();
        let routing = OnCallRouting::new(keys.iter().map(|raw| key(raw)).collect(), refresh.clone())
            .expect("at least one roster key");
        let state = HttpState::new(
            HttpStatePorts {
                books: Arc::new(self.books),
                book_commands: Arc::new(self.book_commands),
                on_call: Arc::new(self.on_call),
                status: Arc::new(self.status),
                roster_cache: Arc::new(self.roster_cache),
                clock: Arc::new(self.clock),
            },
            routing,
        );
        (web::Data::new(state), refresh)
    }
}
