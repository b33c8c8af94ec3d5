//! Authentication core.
//!
//! This module provides:
//! - Persistent token storage over a key-value port
//! - The single-flight refresh coordinator
//! - The session context exposed to the host UI

mod coordinator;
mod refresher;
mod service;
mod session;
mod token_store;

pub use coordinator::{RefreshCoordinator, RefreshError, RefreshOutcome};
pub use refresher::{REFRESH_PATH, RemoteTokenRefresher};
pub use service::AuthService;
pub use session::{SessionContext, SessionError};
pub use token_store::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore, USER_KEY};
