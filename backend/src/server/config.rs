//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use accounts::domain::ports::AccountCommand;
use accounts::inbound::http::session_config::SessionSettings;

/// Everything [`super::create_server`] needs to start listening.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) accounts: Arc<dyn AccountCommand>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        accounts: Arc<dyn AccountCommand>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            accounts,
        }
    }
}
