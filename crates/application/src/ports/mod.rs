//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod auth_api;
mod http_client;
mod key_value_store;
mod navigator;
mod session_observer;
mod token_refresher;

pub use auth_api::AuthApi;
pub use http_client::{HttpClient, HttpClientError};
pub use key_value_store::{KeyValueStore, MemoryKeyValueStore, StorageError};
pub use navigator::Navigator;
pub use session_observer::SessionObserver;
pub use token_refresher::TokenRefresher;
