//! Test doubles shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use prepdesk_domain::{ApiRequest, ApiResponse, HttpMethod, Route};

use crate::ports::{HttpClient, HttpClientError, Navigator};

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, HttpClientError> + Send + Sync>;

/// HTTP client answering from per-route handlers and recording every call.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<(HttpMethod, String), Handler>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers `method path` with the handler.
    pub fn on<F>(&self, method: HttpMethod, path: &str, handler: F)
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, HttpClientError> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .insert((method, path.to_string()), Box::new(handler));
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Number of requests received for `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|r| r.path == path).count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + '_>> {
        self.calls.lock().push(request.clone());

        let reply = match self.routes.lock().get(&(request.method, request.path.clone())) {
            Some(handler) => handler(request),
            None => Ok(ApiResponse::empty(404)),
        };

        Box::pin(async move { reply })
    }
}

/// Navigator remembering every requested route.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

/// A 200 JSON response.
pub fn ok_json(body: &serde_json::Value) -> Result<ApiResponse, HttpClientError> {
    Ok(ApiResponse::json_body(200, body))
}

/// An empty response with the given status.
pub fn status(code: u16) -> Result<ApiResponse, HttpClientError> {
    Ok(ApiResponse::empty(code))
}
