//! Account API client methods

use super::{ensure_success, field, list_field, require_success};
use crate::client::{RequestOptions, StorefrontClient};
use crate::error::Result;
use crate::session::LOGOUT_PATH;
use crate::types::{LoginRequest, SignupRequest, UserProfile};

impl StorefrontClient {
    /// Sign in; the server sets the session cookies.
    ///
    /// Rejected credentials are reported as they are, without a session refresh.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile> {
        let options = RequestOptions::post()
            .with_json(serde_json::to_value(credentials)?)
            .without_retry();
        let mut body = require_success(self.send("/api/users/login", options).await?)?;
        field(&mut body, "data")
    }

    /// Create an account
    pub async fn signup(&self, form: &SignupRequest) -> Result<()> {
        let options = RequestOptions::post()
            .with_json(serde_json::to_value(form)?)
            .without_retry();
        ensure_success(self.send("/api/users/signup", options).await?)?;
        Ok(())
    }

    /// Ask the server to drop the session cookies
    pub async fn logout(&self) -> Result<()> {
        self.send(LOGOUT_PATH, RequestOptions::post()).await?;
        Ok(())
    }

    /// Profile of the signed-in user
    pub async fn me(&self) -> Result<UserProfile> {
        let mut body = require_success(self.send("/api/users/me", RequestOptions::get()).await?)?;
        field(&mut body, "data")
    }

    /// All accounts (admin)
    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        let mut body = ensure_success(self.send("/api/users/all", RequestOptions::get()).await?)?;
        list_field(&mut body, "users")
    }

    /// Delete an account (admin)
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let path = format!("/api/users/{id}");
        ensure_success(self.send(&path, RequestOptions::delete()).await?)?;
        Ok(())
    }
}
