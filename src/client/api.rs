//! The API client and its refresh protocol.
//!
//! REFRESH PROTOCOL
//! ================
//! Per request: send with the current bearer. A 2xx returns as-is. A 401 on
//! a not-yet-retried request exchanges the refresh token for a new access
//! token, writes it through the store, and retries the original request
//! exactly once; a second 401 is surfaced unchanged. Any refresh failure is
//! fatal for the session: the store is cleared, the client navigates to the
//! login entry point, and the original request rejects with
//! [`ApiError::SessionExpired`].
//!
//! CONCURRENCY
//! ===========
//! Concurrent 401s coalesce: the refresh gate serializes refreshers, and a
//! waiter that finds the access token already changed from the one its
//! failed attempt used skips the network call and retries with the fresh
//! token. At most one refresh call reaches the backend per expiry event.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError};
use crate::config::ApiConfig;
use crate::paths;
use crate::session::{SessionStore, SessionUser};

/// Client-side navigation hook, used only for the forced redirect to the
/// login page when a session dies. A browser embedder maps this onto
/// location assignment.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Default navigator: logs the intent and leaves routing to the caller.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(%path, "navigation requested");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad credentials at login. No retry, no session mutation.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The refresh token was rejected; raised only after the session has
    /// been cleared and navigation to login attempted.
    #[error("session expired")]
    SessionExpired,
    /// Any other non-2xx response, surfaced unchanged.
    #[error("api error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        Self::Network(e.0)
    }
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct RefreshedToken {
    access: String,
}

/// Bearer-decorated API client. Cheap to clone; clones share the refresh
/// gate, so coalescing spans every handle over the same session.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    store: SessionStore,
    config: ApiConfig,
    navigator: Arc<dyn Navigator>,
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Production client over reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig, store: SessionStore) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, store, transport, Arc::new(NoopNavigator)))
    }

    /// Client over an explicit transport and navigator.
    #[must_use]
    pub fn with_transport(
        config: ApiConfig,
        store: SessionStore,
        transport: Arc<dyn HttpTransport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { transport, store, config, navigator, refresh_gate: Arc::new(Mutex::new(())) }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    // =========================================================================
    // AUTH FLOWS
    // =========================================================================

    /// Exchange credentials for a session: token pair first, then the user
    /// record, then a single `set_auth`. Nothing is mutated on failure.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidCredentials`] on a 401 from the token endpoint;
    /// other failures surface as status/network/decode errors.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        let response = self
            .transport
            .send(ApiRequest {
                method: Method::Post,
                url: self.config.token_url(),
                bearer: None,
                body: Some(json!({ "email": email, "password": password })),
            })
            .await?;

        if response.status == 401 {
            return Err(ApiError::InvalidCredentials);
        }
        if !response.is_success() {
            return Err(status_error(response));
        }
        let tokens: TokenPair = response.json().map_err(|e| ApiError::Decode(e.to_string()))?;

        // Populate the identity snapshot with the fresh token before any
        // store mutation, so a failed fetch leaves the store untouched.
        let me = self
            .transport
            .send(ApiRequest {
                method: Method::Get,
                url: self.config.me_url(),
                bearer: Some(tokens.access.clone()),
                body: None,
            })
            .await?;
        if !me.is_success() {
            return Err(status_error(me));
        }
        let user: SessionUser = me.json().map_err(|e| ApiError::Decode(e.to_string()))?;

        self.store.set_auth(&tokens.access, &tokens.refresh, user.clone());
        tracing::info!(user_id = user.id, role = user.role.as_str(), "signed in");
        Ok(user)
    }

    /// Tear down the local session. The backend keeps no client-visible
    /// logout state, so this never fails.
    pub fn logout(&self) {
        self.store.clear_auth();
        tracing::info!("signed out");
    }

    /// Fetch the current user record.
    ///
    /// # Errors
    ///
    /// Propagates request errors, including `SessionExpired` after a failed
    /// refresh.
    pub async fn me(&self) -> Result<SessionUser, ApiError> {
        self.get_json("/users/me").await
    }

    /// Re-fetch the identity snapshot and write it through the store,
    /// leaving both tokens intact. Call after profile edits, or on startup
    /// to pick up server-side changes without a re-login.
    ///
    /// # Errors
    ///
    /// Propagates request errors; the store keeps its previous snapshot on
    /// failure.
    pub async fn refresh_profile(&self) -> Result<SessionUser, ApiError> {
        let user = self.me().await?;
        self.store.update_user(user.clone());
        Ok(user)
    }

    // =========================================================================
    // RESOURCE HELPERS
    // =========================================================================

    /// `GET` a resource endpoint and decode its JSON body.
    ///
    /// # Errors
    ///
    /// Propagates request errors; [`ApiError::Decode`] on a body mismatch.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::Get, path, None).await?;
        response.json().map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `POST` a JSON body to a resource endpoint and decode the response.
    ///
    /// # Errors
    ///
    /// Propagates request errors; [`ApiError::Decode`] on a body mismatch.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        let response = self.request(Method::Post, path, Some(body)).await?;
        response.json().map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send one request through the refresh protocol and return the raw
    /// successful response.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] for non-2xx responses (including a 401 on the
    /// retried attempt), [`ApiError::SessionExpired`] when refresh fails,
    /// [`ApiError::Network`] for transport failures.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse, ApiError> {
        let url = self.config.url(path);
        let mut bearer = self.store.access_token();
        let mut retried = false;

        loop {
            let response = self
                .transport
                .send(ApiRequest { method, url: url.clone(), bearer: bearer.clone(), body: body.clone() })
                .await?;

            if response.status == 401 && !retried {
                retried = true;
                tracing::debug!(%url, "access token rejected, refreshing");
                bearer = Some(self.refresh_access_token(bearer.as_deref()).await?);
                continue;
            }
            if response.is_success() {
                return Ok(response);
            }
            return Err(status_error(response));
        }
    }

    // =========================================================================
    // REFRESH
    // =========================================================================

    /// Obtain a fresh access token, coalescing with any refresh already in
    /// flight. `stale` is the bearer the failed attempt used.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        // Another request may have finished the refresh while we waited on
        // the gate; its token is already written through the store.
        if let Some(current) = self.store.access_token() {
            if stale != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.refresh_token() else {
            return Err(self.expire_session("no refresh token available"));
        };

        let response = match self
            .transport
            .send(ApiRequest {
                method: Method::Post,
                url: self.config.token_refresh_url(),
                bearer: None,
                body: Some(json!({ "refresh": refresh_token })),
            })
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.expire_session(&e.to_string())),
        };
        if !response.is_success() {
            return Err(self.expire_session(&format!("refresh rejected with status {}", response.status)));
        }

        let minted: RefreshedToken = match response.json() {
            Ok(minted) => minted,
            Err(e) => return Err(self.expire_session(&e.to_string())),
        };

        self.store.update_access_token(&minted.access);
        tracing::debug!("access token refreshed");
        Ok(minted.access)
    }

    /// Fatal path: clear the session, force navigation to login, and hand
    /// back the error the original request rejects with.
    fn expire_session(&self, reason: &str) -> ApiError {
        tracing::warn!(%reason, "session expired, signing out");
        self.store.clear_auth();
        self.navigator.navigate(paths::LOGIN);
        ApiError::SessionExpired
    }
}

fn status_error(response: ApiResponse) -> ApiError {
    ApiError::Status { status: response.status, body: response.body }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
