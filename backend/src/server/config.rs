//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::web;
use library_api::inbound::http::state::HttpState;

/// Everything the server factory clones into each worker.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: web::Data<HttpState>,
}

impl ServerConfig {
    /// Bundle the listen address and handler state.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: web::Data<HttpState>) -> Self {
        Self {
            bind_addr,
            http_state,
        }
    }
}
