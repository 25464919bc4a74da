//! Session lifecycle
//!
//! [`SessionController`] is the one owner of the client-side session. It
//! reconciles the persisted flag with the server on start-up, performs
//! login and logout, runs the keep-alive while signed in, and publishes every
//! transition through a watch channel ([`SessionController::subscribe`]) and
//! an event stream ([`SessionController::events`]).

pub(crate) mod guard;
mod keepalive;
pub(crate) mod state;
pub mod store;

pub use guard::{LOGOUT_PATH, REFRESH_PATH};
pub use state::{LOGIN_ROUTE, SessionEvent, SessionState};
pub use store::{FileSessionStore, MemorySessionStore, PersistedSession, SessionStore};

use crate::client::StorefrontClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{LoginRequest, SignupRequest, UserProfile};
use crate::validation;
use keepalive::KeepAlive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

/// Message shown when a non-admin account signs in through the admin entry
pub const ADMIN_REQUIRED: &str = "Access denied. Admin credentials required.";

/// Owner of the session lifecycle
pub struct SessionController {
    client: StorefrontClient,
    keepalive: KeepAlive,
}

impl SessionController {
    pub const fn new(client: StorefrontClient, keepalive_interval: Duration) -> Self {
        Self {
            client,
            keepalive: KeepAlive::new(keepalive_interval),
        }
    }

    /// Build the client from configuration, persisting the session to the
    /// configured file
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not a valid absolute URL
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = StorefrontClient::builder()
            .base_url(&config.api_url)
            .user_agent(&config.user_agent)
            .session_store(Arc::new(FileSessionStore::new(&config.session_file)));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, config.keepalive_interval()))
    }

    pub const fn client(&self) -> &StorefrontClient {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.client.session().state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.client.session().subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.client.session().events()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_active()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_admin())
    }

    pub fn keepalive_running(&self) -> bool {
        self.keepalive.is_running()
    }

    /// Reconcile the persisted flag with the server.
    ///
    /// Without a persisted flag no request is made. Otherwise `/api/users/me`
    /// decides: a profile keeps the session, anything else clears the flag.
    pub async fn restore(&self) -> SessionState {
        let session = self.client.session();
        if !session.has_persisted_flag() {
            session.reset();
            return session.state();
        }

        match self.client.me().await {
            Ok(user) => {
                session.authenticate(user);
                self.keepalive.ensure_running(&self.client);
            }
            Err(e) => {
                info!("Stored session is no longer valid: {e}");
                session.reset();
            }
        }

        session.state()
    }

    /// Sign in and start the keep-alive
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request for malformed input,
    /// or the API error when the server refuses the credentials
    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile> {
        validation::validate_login(credentials)?;
        let user = self.client.login(credentials).await?;
        self.client.session().authenticate(user.clone());
        self.keepalive.ensure_running(&self.client);
        Ok(user)
    }

    /// Sign in through the admin entry point.
    ///
    /// A non-admin account is refused and the session left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AccessDenied`] for non-admin accounts, otherwise
    /// as [`Self::login`]
    pub async fn admin_login(&self, credentials: &LoginRequest) -> Result<UserProfile> {
        validation::validate_login(credentials)?;
        let user = self.client.login(credentials).await?;
        if !user.is_admin() {
            warn!(user = %user.email, "Admin login refused for non-admin account");
            return Err(ClientError::AccessDenied(ADMIN_REQUIRED.to_string()));
        }
        self.client.session().authenticate(user.clone());
        self.keepalive.ensure_running(&self.client);
        Ok(user)
    }

    /// Create an account; the new account is not signed in
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input or the API error
    pub async fn signup(&self, form: &SignupRequest) -> Result<()> {
        validation::validate_signup(form)?;
        self.client.signup(form).await?;
        info!(user = %form.email, "Account created");
        Ok(())
    }

    /// Log out on the server, then tear down locally whatever the outcome
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            warn!("Logout request failed: {e}");
        }
        self.keepalive.stop();
        self.client.session().sign_out();
    }
}
