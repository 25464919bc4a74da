//! Storefront HTTP client
//!
//! Every call goes through [`StorefrontClient::send`], which always carries
//! the session cookies, JSON-encodes structured bodies, decodes JSON or text
//! responses, and on a 401 renews the session once before replaying the
//! request a single time.

pub mod request;

pub use request::{FilePart, MultipartForm, RequestBody, RequestOptions};

use crate::error::{ClientError, Result};
use crate::session::guard::SessionGuard;
use crate::session::state::SessionShared;
use crate::session::store::{MemorySessionStore, SessionStore};
use request::{is_session_path, read_body};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

struct ClientInner {
    http: Client,
    base_url: String,
    guard: SessionGuard,
}

/// Storefront API client
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<ClientInner>,
}

impl StorefrontClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid absolute URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> StorefrontClientBuilder {
        StorefrontClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn session(&self) -> &SessionShared {
        self.inner.guard.shared()
    }

    pub(crate) fn guard(&self) -> &SessionGuard {
        &self.inner.guard
    }

    /// Renew the session now, sharing any refresh already in flight
    pub async fn refresh(&self) -> bool {
        self.inner.guard.refresh().await
    }

    /// Send a request and return the decoded body.
    ///
    /// A 401 on any path other than the refresh and logout endpoints, with
    /// `retry` set, renews the session and replays the request once with
    /// `retry` cleared, so a replay can never refresh again.
    ///
    /// # Errors
    ///
    /// Transport failures, and non-2xx responses classified by status with
    /// the parsed body attached
    pub async fn send(&self, path: &str, options: RequestOptions) -> Result<Value> {
        let (status, body) = self.execute_once(path, &options).await?;
        if status.is_success() {
            return Ok(body);
        }

        if status == StatusCode::UNAUTHORIZED && options.retry && !is_session_path(path) {
            warn!(path, "Request unauthorized, refreshing session");
            if self.inner.guard.refresh().await {
                let replay = options.into_replay();
                let (status, body) = self.execute_once(path, &replay).await?;
                return settle(status, body);
            }
        }

        settle(status, body)
    }

    /// Send a request and deserialize the decoded body
    ///
    /// # Errors
    ///
    /// As [`Self::send`], plus a serialization error if the body has a
    /// different shape
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let body = self.send(path, options).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn execute_once(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<(StatusCode, Value)> {
        let url = format!("{}{}", self.inner.base_url, path);

        let mut headers = options.headers.clone();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url)
            .headers(headers);

        request = match &options.body {
            Some(RequestBody::Json(body)) => request.json(body),
            Some(RequestBody::Multipart(form)) => request.multipart(form.to_form()?),
            None => request,
        };

        debug!(method = %options.method, path, retry = options.retry, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, path, "Received response");

        Ok((status, read_body(response).await))
    }
}

fn settle(status: StatusCode, body: Value) -> Result<Value> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ClientError::from_status(status, body))
    }
}

/// Builder for StorefrontClient
#[derive(Default)]
pub struct StorefrontClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session_store: Option<Arc<dyn SessionStore>>,
}

impl StorefrontClientBuilder {
    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set where the session flag and cookies are persisted
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or not absolute, or the
    /// transport cannot be initialized
    pub fn build(self) -> Result<StorefrontClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url '{base_url}': {e}")))?;

        let store = self
            .session_store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let shared = Arc::new(SessionShared::restore(store));

        let mut client_builder = ClientBuilder::new().cookie_provider(shared.cookie_jar());

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent(concat!(
                "storefront-client/",
                env!("CARGO_PKG_VERSION")
            ));
        }

        let http = client_builder.build()?;
        let guard = SessionGuard::new(http.clone(), &base_url, shared);

        Ok(StorefrontClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                guard,
            }),
        })
    }
}
