//! API request value

use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

const BEARER_PREFIX: &str = "Bearer ";

/// A request against the backend API.
///
/// `path` is either relative to the configured base URL or an absolute
/// `http(s)` URL. The `retried` marker travels with the request value itself
/// and is never serialized into a header.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Unique identifier, used to correlate log lines.
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Relative path or absolute URL
    pub path: String,
    /// HTTP headers
    pub headers: Headers,
    /// Query string parameters, in order
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<Value>,
    /// Per-request timeout overriding the client default
    pub timeout_ms: Option<u64>,
    /// Set once the request has been re-issued after a refresh.
    pub retried: bool,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            headers: Headers::new(),
            query: Vec::new(),
            body: None,
            timeout_ms: None,
            retried: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Adds a header, replacing any header with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value cannot be represented
    /// as JSON.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Returns the bearer token carried by this request, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
    }

    /// Attaches `Authorization: Bearer <token>`.
    pub fn set_bearer_token(&mut self, token: &str) {
        self.headers.set(AUTHORIZATION, format!("{BEARER_PREFIX}{token}"));
    }

    /// Resolves the request path against a base URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the result is not a valid URL.
    pub fn resolve_url(&self, base: &Url) -> DomainResult<Url> {
        let mut url = if self.path.starts_with("http://") || self.path.starts_with("https://") {
            Url::parse(&self.path).map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.path)))?
        } else {
            let mut base = base.clone();
            if !base.path().ends_with('/') {
                let with_slash = format!("{}/", base.path());
                base.set_path(&with_slash);
            }
            base.join(self.path.trim_start_matches('/'))
                .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.path)))?
        };

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}
