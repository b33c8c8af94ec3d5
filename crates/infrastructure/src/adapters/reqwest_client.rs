//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port on top of `reqwest`.
//! Request paths are resolved against the configured API base URL.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use prepdesk_application::ports::{HttpClient, HttpClientError};
use prepdesk_domain::{ApiRequest, ApiResponse, ClientSettings, HttpMethod};
use reqwest::{Client, Method, Url};
use tracing::trace;

const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    default_timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a client from the loaded settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the base URL does not parse, `Other` if the
    /// reqwest client cannot be built.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpClientError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", settings.base_url)))?;
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            default_timeout_ms: settings.request_timeout_ms,
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + '_>> {
        let url = request
            .resolve_url(&self.base_url)
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()));
        let method = request.method;
        let headers: Vec<_> = request.headers.iter().cloned().collect();
        let body = request.body.clone();
        let timeout_ms = request.timeout_ms.unwrap_or(self.default_timeout_ms);

        Box::pin(async move {
            let url = url?;
            trace!(%url, %method, "executing request");
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url)
                .timeout(Duration::from_millis(timeout_ms));

            for header in &headers {
                builder = builder.header(&header.name, &header.value);
            }

            if let Some(body) = &body {
                let bytes =
                    serde_json::to_vec(body).map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;
                let has_content_type = headers
                    .iter()
                    .any(|h| h.name.eq_ignore_ascii_case("content-type"));
                if !has_content_type {
                    builder = builder.header("Content-Type", "application/json");
                }
                builder = builder.body(bytes);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            Ok(ApiResponse::new(
                status,
                response_headers,
                body_bytes,
                start.elapsed(),
            ))
        })
    }
}
