//! Prepdesk Application - Session and API client core
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for transport, storage, navigation and the auth service)
//! - The token store, refresh coordinator and authenticated request pipeline
//! - The session context and thin service wrappers over backend endpoints

pub mod api_client;
pub mod auth;
pub mod error;
pub mod ports;
pub mod runtime;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use api_client::AuthenticatedClient;
pub use auth::{
    AuthService, RefreshCoordinator, RefreshError, RemoteTokenRefresher, SessionContext,
    SessionError, TokenStore,
};
pub use error::{ApiError, ApiResult};
pub use ports::{
    AuthApi, HttpClient, HttpClientError, KeyValueStore, MemoryKeyValueStore, Navigator,
    SessionObserver, StorageError, TokenRefresher,
};
pub use runtime::ClientRuntime;
pub use services::PaymentService;
