//! Token refresh port

use async_trait::async_trait;
use prepdesk_domain::RefreshedTokens;

use crate::ApiResult;

/// Performs a single physical refresh call against the auth service.
///
/// Retrying, deduplication and persistence are the coordinator's job.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges a refresh token for a new access token.
    ///
    /// # Errors
    /// Returns an error if the call fails or the server rejects the token.
    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshedTokens>;
}
