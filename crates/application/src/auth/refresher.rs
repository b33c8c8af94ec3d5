//! Refresh call against the remote auth service.

use std::sync::Arc;

use async_trait::async_trait;
use prepdesk_domain::{ApiRequest, RefreshedTokens};
use serde::Serialize;
use tracing::debug;

use crate::ports::{HttpClient, TokenRefresher};
use crate::{ApiError, ApiResult};

/// Path of the refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Posts the refresh token to `/auth/refresh` over the raw transport.
///
/// The call bypasses the authenticated pipeline so a failing refresh can
/// never trigger another refresh.
pub struct RemoteTokenRefresher {
    http: Arc<dyn HttpClient>,
}

impl RemoteTokenRefresher {
    /// Creates a refresher using the given transport.
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TokenRefresher for RemoteTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshedTokens> {
        let request = ApiRequest::post(REFRESH_PATH).with_json(&RefreshBody { refresh_token })?;
        debug!(request_id = %request.id, "requesting token refresh");

        let response = self.http.execute(&request).await?;
        let response = ApiError::check(response)?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedHttpClient, ok_json, status};
    use prepdesk_domain::HttpMethod;
    use serde_json::json;

    #[tokio::test]
    async fn test_refresh_posts_token_without_authorization() {
        let http = ScriptedHttpClient::new();
        http.on(HttpMethod::Post, REFRESH_PATH, |_| {
            ok_json(&json!({"accessToken": "a2", "refreshToken": "r2"}))
        });
        let refresher = RemoteTokenRefresher::new(http.clone());

        let tokens = refresher.refresh("r1").await.unwrap();

        assert_eq!(tokens.access_token, "a2");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r2"));
        let calls = http.calls();
        assert_eq!(calls[0].body, Some(json!({"refreshToken": "r1"})));
        assert!(calls[0].bearer_token().is_none());
    }

    #[tokio::test]
    async fn test_rejected_refresh_is_an_error() {
        let http = ScriptedHttpClient::new();
        http.on(HttpMethod::Post, REFRESH_PATH, |_| status(401));
        let refresher = RemoteTokenRefresher::new(http);

        let error = refresher.refresh("revoked").await.unwrap_err();
        assert!(error.is_unauthorized());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let http = ScriptedHttpClient::new();
        http.on(HttpMethod::Post, REFRESH_PATH, |_| ok_json(&json!({"token": "x"})));
        let refresher = RemoteTokenRefresher::new(http);

        let error = refresher.refresh("r1").await.unwrap_err();
        assert!(matches!(error, ApiError::Decode(_)));
    }
}
