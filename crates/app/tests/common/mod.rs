//! In-process fake of the Prepdesk backend.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use prepdesk_application::{ClientRuntime, HttpClient, HttpClientError, Navigator};
use prepdesk_domain::{ApiRequest, ApiResponse, HttpMethod, RetryPolicy, Route, TokenPair, User};
use prepdesk_infrastructure::FileKeyValueStore;
use serde_json::json;
use tokio::time::Instant;

pub const COURSES: &str = "/courses";
pub const REFRESH: &str = "/auth/refresh";
pub const PASSWORD: &str = "correct horse";

/// Scripted answer of the refresh endpoint.
#[derive(Debug, Clone)]
pub enum RefreshReply {
    /// Rotate to this access token.
    Grant(&'static str),
    /// Respond with this status.
    Fail(u16),
}

/// One request seen by the backend.
#[derive(Debug, Clone)]
pub struct Call {
    pub at: Instant,
    pub method: HttpMethod,
    pub path: String,
    pub bearer: Option<String>,
}

struct State {
    valid_access: String,
    refresh_script: VecDeque<RefreshReply>,
    logout_reachable: bool,
    calls: Vec<Call>,
}

/// Backend accepting a single valid access token at a time.
pub struct FakeBackend {
    state: Mutex<State>,
    refresh_latency: Duration,
}

impl FakeBackend {
    pub fn new(valid_access: &str, refresh_script: Vec<RefreshReply>) -> Arc<Self> {
        Self::with_latency(valid_access, refresh_script, Duration::ZERO)
    }

    pub fn with_latency(
        valid_access: &str,
        refresh_script: Vec<RefreshReply>,
        refresh_latency: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                valid_access: valid_access.to_string(),
                refresh_script: refresh_script.into(),
                logout_reachable: true,
                calls: Vec::new(),
            }),
            refresh_latency,
        })
    }

    pub fn take_logout_offline(&self) {
        self.state.lock().logout_reachable = false;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    fn answer(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError> {
        let mut state = self.state.lock();
        state.calls.push(Call {
            at: Instant::now(),
            method: request.method,
            path: request.path.clone(),
            bearer: request.bearer_token().map(String::from),
        });
        let authorized = request.bearer_token() == Some(state.valid_access.as_str());

        match (request.method, request.path.as_str()) {
            (HttpMethod::Post, "/auth/login") => {
                let body = request.body.clone().unwrap_or_default();
                if body["password"] == PASSWORD {
                    Ok(ApiResponse::json_body(
                        200,
                        &json!({
                            "user": {
                                "id": "u-1",
                                "identifier": body["identifier"],
                                "roles": ["student"]
                            },
                            "token": state.valid_access,
                            "refreshToken": "refresh-1"
                        }),
                    ))
                } else {
                    Ok(ApiResponse::empty(401))
                }
            }
            (HttpMethod::Post, REFRESH) => match state.refresh_script.pop_front() {
                Some(RefreshReply::Grant(token)) => {
                    state.valid_access = token.to_string();
                    Ok(ApiResponse::json_body(200, &json!({ "accessToken": token })))
                }
                Some(RefreshReply::Fail(code)) => Ok(ApiResponse::empty(code)),
                None => Ok(ApiResponse::empty(401)),
            },
            (HttpMethod::Post, "/auth/logout") if !state.logout_reachable => {
                Err(HttpClientError::ConnectionRefused {
                    host: "api.prepdesk.test".to_string(),
                    port: 443,
                })
            }
            (HttpMethod::Post, "/auth/logout") => Ok(ApiResponse::empty(204)),
            (HttpMethod::Get, COURSES) if authorized => {
                Ok(ApiResponse::json_body(200, &json!(["algebra", "physics"])))
            }
            _ if !authorized => Ok(ApiResponse::empty(401)),
            _ => Ok(ApiResponse::empty(404)),
        }
    }
}

impl HttpClient for FakeBackend {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + '_>> {
        let is_refresh = request.path == REFRESH;
        let request = request.clone();
        Box::pin(async move {
            if is_refresh && !self.refresh_latency.is_zero() {
                tokio::time::sleep(self.refresh_latency).await;
            }
            self.answer(&request)
        })
    }
}

/// Navigator remembering every requested route.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

/// Runtime over the fake backend with a session file at `session`.
pub fn runtime(
    backend: &Arc<FakeBackend>,
    session: &Path,
    navigator: &Arc<RecordingNavigator>,
) -> ClientRuntime {
    let store = Arc::new(FileKeyValueStore::open(session).unwrap());
    ClientRuntime::new(
        backend.clone(),
        store,
        navigator.clone(),
        RetryPolicy::new(3, Duration::from_millis(500)),
    )
}

/// Persists a signed-in session holding `access`.
pub fn seed_session(session: &Path, access: &str) {
    let store = Arc::new(FileKeyValueStore::open(session).unwrap());
    let tokens = prepdesk_application::TokenStore::new(store);
    tokens
        .store_session(&TokenPair::new(access, "refresh-1"), &User::new("u-1", "ada"))
        .unwrap();
}
