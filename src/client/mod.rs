//! Platform-agnostic client lifecycle.
//!
//! A [`Client`] wraps one [`Platform`] implementation. It starts
//! disconnected; [`Client::connect`] opens a [`Session`], validates the
//! credentials by retrieving the current user and only then moves to the
//! connected state. Platform sub-clients borrow the connected session.

pub mod hooks;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::User;
use crate::transport::ClientTransport;

pub use hooks::{EventHooks, EventHooksBuilder};
pub use session::Session;

/// A subscription platform the collector can talk to.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Display name, also reported by entities as their client name.
    fn name(&self) -> &'static str;

    /// Base URL relative request paths are resolved against.
    fn base_url(&self) -> Url;

    fn default_headers(&self) -> Result<HeaderMap>;

    /// Cookies sent with every request, in order.
    fn cookies(&self) -> Vec<(String, String)>;

    /// Retrieve the authenticated user, failing with
    /// [`Error::RetrieveUser`] when the credentials are rejected.
    async fn retrieve_user(&self, session: &Session) -> Result<User>;
}

/// Connection state of a [`Client`].
#[derive(Debug, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected { session: Session, user: User },
}

/// Client for one platform.
pub struct Client<P: Platform> {
    platform: P,
    transport: Arc<ClientTransport>,
    hooks: EventHooks,
    state: ConnectionState,
}

impl<P: Platform> Client<P> {
    /// Create a disconnected client with the default hooks.
    pub fn new(platform: P, config: &ClientConfig) -> Result<Self> {
        let transport = ClientTransport::new(config)?;
        tracing::info!(
            "Client created{}.",
            if config.cache_max_age()? == 0 {
                " without caching"
            } else {
                ""
            }
        );
        Ok(Self::with_transport(platform, transport))
    }

    /// Create a disconnected client around an existing transport.
    pub fn with_transport(platform: P, transport: ClientTransport) -> Self {
        Self {
            platform,
            transport: Arc::new(transport),
            hooks: EventHooks::defaults(),
            state: ConnectionState::Disconnected,
        }
    }

    /// Replace the hooks used by sessions opened from now on.
    pub fn with_hooks(mut self, hooks: EventHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    /// Open a session and validate the credentials.
    ///
    /// Connecting an already connected client replaces its session.
    pub async fn connect(&mut self) -> Result<&User> {
        let session = Session::new(
            self.transport.clone(),
            self.platform.base_url(),
            self.platform.default_headers()?,
            &self.platform.cookies(),
            self.hooks.clone(),
        )?;

        let user = self.platform.retrieve_user(&session).await?;
        tracing::info!(
            "The session for {} has been connected. Current user in the session: {} (ID: {})",
            user.client_name(),
            user.name,
            user.id
        );

        self.state = ConnectionState::Connected { session, user };
        self.user()
    }

    /// Drop the session. The client can be connected again.
    pub fn close(&mut self) {
        if self.is_connected() {
            tracing::info!("Client closed.");
        }
        self.state = ConnectionState::Disconnected;
    }

    pub fn session(&self) -> Result<&Session> {
        match &self.state {
            ConnectionState::Connected { session, .. } => Ok(session),
            ConnectionState::Disconnected => Err(Error::NotConnected),
        }
    }

    /// The user retrieved on connect.
    pub fn user(&self) -> Result<&User> {
        match &self.state {
            ConnectionState::Connected { user, .. } => Ok(user),
            ConnectionState::Disconnected => Err(Error::NotConnected),
        }
    }
}

impl<P: Platform + std::fmt::Debug> std::fmt::Debug for Client<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("platform", &self.platform)
            .field("transport", &self.transport)
            .field("state", &self.state)
            .finish()
    }
}
