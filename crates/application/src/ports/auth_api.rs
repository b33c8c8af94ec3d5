//! Remote auth service port

use async_trait::async_trait;
use prepdesk_domain::{Credentials, LoginResponse, Profile, Registration, RegistrationReceipt};

use crate::ApiResult;

/// The remote authentication service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;

    /// `POST /auth/register`. No tokens are issued before verification.
    async fn register(&self, registration: &Registration) -> ApiResult<RegistrationReceipt>;

    /// `POST /auth/logout`.
    async fn logout(&self) -> ApiResult<()>;

    /// `GET /auth/profile`.
    async fn profile(&self) -> ApiResult<Profile>;
}
