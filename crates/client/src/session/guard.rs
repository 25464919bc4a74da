//! Silent session renewal
//!
//! The guard turns a 401 into at most one refresh call, no matter how many
//! requests hit the expired session at the same time. Callers that arrive
//! while a refresh is pending await the same outcome. A failed refresh ends
//! the session: the persisted flag is cleared, the server is asked to drop
//! its cookies, and a [`SessionEvent::LoginRequired`] is published once.
//!
//! [`SessionEvent::LoginRequired`]: super::SessionEvent::LoginRequired

use super::state::SessionShared;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const REFRESH_PATH: &str = "/api/users/refresh";
pub const LOGOUT_PATH: &str = "/api/users/logout";

type PendingRefresh = Shared<BoxFuture<'static, bool>>;

pub(crate) struct SessionGuard {
    http: Client,
    refresh_url: String,
    logout_url: String,
    shared: Arc<SessionShared>,
    inflight: Mutex<Option<PendingRefresh>>,
}

impl SessionGuard {
    pub(crate) fn new(http: Client, base_url: &str, shared: Arc<SessionShared>) -> Self {
        Self {
            http,
            refresh_url: format!("{base_url}{REFRESH_PATH}"),
            logout_url: format!("{base_url}{LOGOUT_PATH}"),
            shared,
            inflight: Mutex::new(None),
        }
    }

    pub(crate) fn shared(&self) -> &Arc<SessionShared> {
        &self.shared
    }

    /// Renew the session, joining a refresh that is already in flight.
    ///
    /// Returns `true` when the session was renewed.
    pub(crate) async fn refresh(&self) -> bool {
        let pending = {
            let mut inflight = self.inflight.lock().await;
            // A finished attempt left behind by a cancelled caller is not joined
            if let Some(pending) = inflight.as_ref().filter(|p| p.peek().is_none()) {
                debug!("Joining in-flight session refresh");
                pending.clone()
            } else {
                let pending = Self::attempt(
                    self.http.clone(),
                    self.refresh_url.clone(),
                    self.logout_url.clone(),
                    self.shared.clone(),
                )
                .boxed()
                .shared();
                *inflight = Some(pending.clone());
                pending
            }
        };

        let renewed = pending.clone().await;

        let mut inflight = self.inflight.lock().await;
        if inflight
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            *inflight = None;
        }

        renewed
    }

    /// Fire-and-log refresh used by the keep-alive; no state transitions
    pub(crate) async fn ping(&self) {
        match request_refresh(&self.http, &self.refresh_url).await {
            Ok(true) => {
                debug!("Keep-alive refresh succeeded");
                if self.shared.state().is_active() {
                    self.shared.persist();
                }
            }
            Ok(false) => warn!("Keep-alive refresh was rejected"),
            Err(e) => error!("Keep-alive refresh failed: {e}"),
        }
    }

    async fn attempt(
        http: Client,
        refresh_url: String,
        logout_url: String,
        shared: Arc<SessionShared>,
    ) -> bool {
        shared.begin_refresh();

        let renewed = match request_refresh(&http, &refresh_url).await {
            Ok(renewed) => renewed,
            Err(e) => {
                error!("Session refresh request failed: {e}");
                false
            }
        };

        if renewed {
            info!("Session refreshed");
            shared.resume();
        } else {
            // Best effort: the server may already consider us logged out
            match http.post(&logout_url).send().await {
                Ok(response) => debug!(status = %response.status(), "Logout after failed refresh"),
                Err(e) => debug!("Logout after failed refresh did not reach the server: {e}"),
            }
            shared.expire();
        }

        renewed
    }
}

/// POST the refresh endpoint; renewed only on a 2xx carrying `success: true`
async fn request_refresh(http: &Client, url: &str) -> reqwest::Result<bool> {
    let response = http
        .post(url)
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        debug!(%status, "Refresh rejected");
        return Ok(false);
    }

    let body = match response.json::<Value>().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Refresh response was not JSON: {e}");
            return Ok(false);
        }
    };

    let success = body.get("success").and_then(Value::as_bool) == Some(true);
    if !success {
        debug!(%status, "Refresh answered without success flag");
    }
    Ok(success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemorySessionStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn guard(server: &MockServer) -> SessionGuard {
        let shared = Arc::new(SessionShared::restore(Arc::new(MemorySessionStore::new())));
        SessionGuard::new(Client::new(), &server.uri(), shared)
    }

    #[tokio::test]
    async fn finished_attempt_left_in_slot_is_not_reused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(LOGOUT_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let guard = guard(&server);

        // Completed result whose caller never came back to clear the slot
        let stale: PendingRefresh = futures::future::ready(true).boxed().shared();
        assert!(stale.clone().await);
        *guard.inflight.lock().await = Some(stale);

        assert!(!guard.refresh().await);
        assert!(guard.inflight.lock().await.is_none());
    }
}
