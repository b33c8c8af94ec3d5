//! Auth service wrapper over the backend endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use prepdesk_domain::{
    ApiRequest, Credentials, LoginResponse, Profile, Registration, RegistrationReceipt,
};

use crate::ApiResult;
use crate::api_client::AuthenticatedClient;
use crate::ports::AuthApi;

/// Remote auth service reached through the authenticated pipeline.
///
/// Login and registration go out without credentials. Logout carries the
/// bearer token but never triggers a refresh; profile uses the full pipeline.
pub struct AuthService {
    client: Arc<AuthenticatedClient>,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for AuthService {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let request = ApiRequest::post("/auth/login").with_json(credentials)?;
        let response = self.client.send_public(request).await?;
        Ok(response.json()?)
    }

    async fn register(&self, registration: &Registration) -> ApiResult<RegistrationReceipt> {
        let request = ApiRequest::post("/auth/register").with_json(registration)?;
        let response = self.client.send_public(request).await?;
        Ok(response.json()?)
    }

    async fn logout(&self) -> ApiResult<()> {
        let request = ApiRequest::post("/auth/logout").with_json(&serde_json::json!({}))?;
        self.client.send_without_refresh(request).await?;
        Ok(())
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.client.get_json("/auth/profile").await
    }
}
