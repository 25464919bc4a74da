//! Session state shared by the request wrapper, the guard and the controller

use super::store::{PersistedSession, SessionStore};
use crate::types::UserProfile;
use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use std::sync::{Arc, PoisonError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Entry point an expired session hands control back to
pub const LOGIN_ROUTE: &str = "/login";

const EVENT_CAPACITY: usize = 16;

/// Client-side view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session, or the last one ended
    Unauthenticated,
    /// Cookies are believed valid; the profile is known once loaded
    Authenticated { user: Option<UserProfile> },
    /// A 401 was seen and a refresh is in flight
    Refreshing { user: Option<UserProfile> },
}

impl SessionState {
    /// Authenticated or about to be again
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Authenticated { .. } | Self::Refreshing { .. })
    }

    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user } | Self::Refreshing { user } => user.as_ref(),
            Self::Unauthenticated => None,
        }
    }
}

/// Session transitions the application layer reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserProfile),
    SignedOut,
    /// Refresh failed; the session is gone and the user must sign in again
    LoginRequired { redirect_to: String },
}

/// Owner of the session state, the persisted record, and the cookie jar
pub(crate) struct SessionShared {
    state_tx: watch::Sender<SessionState>,
    events_tx: broadcast::Sender<SessionEvent>,
    store: Arc<dyn SessionStore>,
    jar: Arc<CookieStoreMutex>,
}

impl SessionShared {
    /// Seed the jar and the initial state from whatever a previous run persisted
    pub(crate) fn restore(store: Arc<dyn SessionStore>) -> Self {
        let persisted = match store.load() {
            Ok(persisted) => persisted.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable persisted session: {e}");
                PersistedSession::default()
            }
        };

        let jar = Arc::new(CookieStoreMutex::new(load_cookies(persisted.cookies.as_deref())));

        let initial = if persisted.is_authenticated {
            SessionState::Authenticated { user: None }
        } else {
            SessionState::Unauthenticated
        };
        debug!(state = ?initial, "Session restored from store");

        let (state_tx, _) = watch::channel(initial);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state_tx,
            events_tx,
            store,
            jar,
        }
    }

    /// Cookie store handed to the HTTP client
    pub(crate) fn cookie_jar(&self) -> Arc<CookieStoreMutex> {
        self.jar.clone()
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Whether the persisted flag claims a session
    pub(crate) fn has_persisted_flag(&self) -> bool {
        match self.store.load() {
            Ok(persisted) => persisted.is_some_and(|p| p.is_authenticated),
            Err(e) => {
                warn!("Failed to read persisted session: {e}");
                false
            }
        }
    }

    /// Every cookie in the jar with its path, domain and expiry, as JSON
    fn saved_cookies(&self) -> Option<String> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::new();
        // Session cookies have no expiry but still carry the server-side session
        match cookie_store::serde::json::save_incl_expired_and_nonpersistent(&jar, &mut out) {
            Ok(()) => String::from_utf8(out).ok(),
            Err(e) => {
                warn!("Failed to serialize cookies: {e}");
                None
            }
        }
    }

    /// Write the flag and the current cookies
    pub(crate) fn persist(&self) {
        let record = PersistedSession {
            is_authenticated: true,
            cookies: self.saved_cookies(),
        };
        if let Err(e) = self.store.save(&record) {
            warn!("Failed to persist session: {e}");
        }
    }

    fn forget(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear persisted session: {e}");
        }
    }

    /// A sign-in completed with a known profile
    pub(crate) fn authenticate(&self, user: UserProfile) {
        self.persist();
        info!(user = %user.email, role = %user.role, "Signed in");
        self.state_tx.send_replace(SessionState::Authenticated {
            user: Some(user.clone()),
        });
        self.events_tx.send(SessionEvent::SignedIn(user)).ok();
    }

    pub(crate) fn begin_refresh(&self) {
        self.state_tx.send_modify(|state| {
            *state = SessionState::Refreshing {
                user: state.user().cloned(),
            };
        });
    }

    /// Refresh succeeded: keep the profile, store the rotated cookies
    pub(crate) fn resume(&self) {
        self.persist();
        self.state_tx.send_modify(|state| {
            *state = SessionState::Authenticated {
                user: state.user().cloned(),
            };
        });
    }

    /// Explicit logout
    pub(crate) fn sign_out(&self) {
        self.forget();
        self.state_tx.send_replace(SessionState::Unauthenticated);
        info!("Signed out");
        self.events_tx.send(SessionEvent::SignedOut).ok();
    }

    /// Refresh failed: drop everything and send the user back to login
    pub(crate) fn expire(&self) {
        self.forget();
        self.state_tx.send_replace(SessionState::Unauthenticated);
        warn!("Session expired, login required");
        self.events_tx
            .send(SessionEvent::LoginRequired {
                redirect_to: LOGIN_ROUTE.to_string(),
            })
            .ok();
    }

    /// Stale flag found on start-up; no event, nobody was signed in yet
    pub(crate) fn reset(&self) {
        self.forget();
        self.state_tx.send_replace(SessionState::Unauthenticated);
    }
}

fn load_cookies(saved: Option<&str>) -> CookieStore {
    let Some(saved) = saved else {
        return CookieStore::default();
    };
    cookie_store::serde::json::load_all(saved.as_bytes()).unwrap_or_else(|e| {
        warn!("Ignoring unreadable persisted cookies: {e}");
        CookieStore::default()
    })
}
