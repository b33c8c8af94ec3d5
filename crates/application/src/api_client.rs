//! Authenticated request pipeline.
//!
//! Every request gets the stored access token attached. A 401 on a request
//! that has not been retried yet asks the [`RefreshCoordinator`] for a fresh
//! token and re-issues the request exactly once. Every other failure passes
//! through unchanged.

use std::sync::Arc;

use prepdesk_domain::{ApiRequest, ApiResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{RefreshCoordinator, TokenStore};
use crate::ports::HttpClient;
use crate::{ApiError, ApiResult};

/// HTTP client that authenticates requests and recovers from expired tokens.
pub struct AuthenticatedClient {
    http: Arc<dyn HttpClient>,
    tokens: TokenStore,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthenticatedClient {
    /// Creates a pipeline over the given transport.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpClient>,
        tokens: TokenStore,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            http,
            tokens,
            coordinator,
        }
    }

    /// Returns the refresh coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Sends a request with the stored access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the 401 could not be recovered
    /// (the original response if no fresh token was obtained, the retried one
    /// otherwise), `Status` for other non-2xx statuses and `Transport` when no
    /// response arrived.
    pub async fn send(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        if let Some(token) = self.tokens.access_token() {
            request.set_bearer_token(&token);
        }

        let response = self.execute(&request).await?;
        if !response.status.is_unauthorized() || request.retried {
            return ApiError::check(response);
        }

        request.retried = true;
        match self.coordinator.ensure_fresh_token().await {
            Ok(Some(token)) => {
                debug!(request_id = %request.id, "retrying request with refreshed token");
                request.set_bearer_token(&token);
                let retried = self.execute(&request).await?;
                ApiError::check(retried)
            }
            Ok(None) => Err(ApiError::Unauthorized { response }),
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "could not refresh token");
                Err(ApiError::Unauthorized { response })
            }
        }
    }

    /// Sends a request with the stored access token but without 401 recovery.
    ///
    /// Used for logout, which must not start a refresh for a session that is
    /// being discarded anyway.
    ///
    /// # Errors
    ///
    /// Same classification as [`AuthenticatedClient::send`].
    pub async fn send_without_refresh(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        if let Some(token) = self.tokens.access_token() {
            request.set_bearer_token(&token);
        }
        let response = self.execute(&request).await?;
        ApiError::check(response)
    }

    /// Sends a request without credentials and without 401 recovery.
    ///
    /// Used for login and registration.
    ///
    /// # Errors
    ///
    /// Same classification as [`AuthenticatedClient::send`].
    pub async fn send_public(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let response = self.execute(&request).await?;
        ApiError::check(response)
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Fails like [`AuthenticatedClient::send`], or with `Decode` when the
    /// body does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.send(request).await?;
        Ok(response.json()?)
    }

    /// `GET path` decoded as JSON.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body, response decoded as JSON.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send_json`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).with_json(body)?).await
    }

    async fn execute(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            retried = request.retried,
            "sending request"
        );
        let response = self.http.execute(request).await?;
        debug!(
            request_id = %request.id,
            status = response.status.as_u16(),
            elapsed_ms = response.elapsed.as_millis(),
            "received response"
        );
        Ok(response)
    }
}
