//! Wiring of the client core.

use std::sync::Arc;

use prepdesk_domain::RetryPolicy;

use crate::api_client::AuthenticatedClient;
use crate::auth::{AuthService, RefreshCoordinator, RemoteTokenRefresher, SessionContext, TokenStore};
use crate::ports::{HttpClient, KeyValueStore, Navigator};
use crate::services::PaymentService;

/// Every long-lived component of the client, built over the given adapters.
///
/// All components share one token store and one refresh coordinator, so
/// there is exactly one refresh in flight per process.
pub struct ClientRuntime {
    /// Persistent token storage.
    pub tokens: TokenStore,
    /// Single-flight refresh coordinator.
    pub coordinator: Arc<RefreshCoordinator>,
    /// Authenticated request pipeline.
    pub client: Arc<AuthenticatedClient>,
    /// Session state.
    pub session: Arc<SessionContext>,
    /// Payment verification.
    pub payments: PaymentService,
}

impl ClientRuntime {
    /// Assembles the runtime.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        policy: RetryPolicy,
    ) -> Self {
        let tokens = TokenStore::new(store);
        let refresher = Arc::new(RemoteTokenRefresher::new(Arc::clone(&http)));
        let coordinator = Arc::new(RefreshCoordinator::new(refresher, tokens.clone(), policy));
        let client = Arc::new(AuthenticatedClient::new(
            http,
            tokens.clone(),
            Arc::clone(&coordinator),
        ));
        let auth = Arc::new(AuthService::new(Arc::clone(&client)));
        let session = SessionContext::new(auth, tokens.clone(), Arc::clone(&coordinator), navigator);
        let payments = PaymentService::new(Arc::clone(&client));

        Self {
            tokens,
            coordinator,
            client,
            session,
            payments,
        }
    }
}
