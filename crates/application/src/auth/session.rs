//! Session context: the authentication state exposed to the host UI.
//!
//! State machine: `Loading -> {Authenticated, Anonymous}`. The context is a
//! [`SessionObserver`] of the refresh coordinator: an exhausted refresh turns
//! it `Anonymous` and navigates to the login route before the failing request
//! returns.

use std::sync::{Arc, Weak};

use prepdesk_domain::{
    AuthEvent, Credentials, Registration, RegistrationReceipt, Route, SessionState, User,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{RefreshCoordinator, TokenStore};
use crate::ApiError;
use crate::ports::{AuthApi, Navigator, SessionObserver, StorageError};

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation requires a signed-in user.
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Process-wide authentication state.
pub struct SessionContext {
    auth: Arc<dyn AuthApi>,
    tokens: TokenStore,
    coordinator: Arc<RefreshCoordinator>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    /// Creates a context in the `Loading` state and registers it with the
    /// coordinator.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthApi>,
        tokens: TokenStore,
        coordinator: Arc<RefreshCoordinator>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let session = Arc::new(Self {
            auth,
            tokens,
            coordinator: Arc::clone(&coordinator),
            navigator,
            state: watch::Sender::new(SessionState::Loading),
        });
        let observer: Weak<dyn SessionObserver> = Arc::downgrade(&session) as Weak<Self>;
        coordinator.observe(observer);
        session
    }

    /// Reads the persisted session and leaves `Loading`.
    ///
    /// A token pair together with a cached user yields `Authenticated`.
    /// Anything partial is cleared and yields `Anonymous`.
    pub fn initialize(&self) -> SessionState {
        let state = match (self.tokens.tokens(), self.tokens.user()) {
            (Some(_), Some(user)) => SessionState::Authenticated { user },
            _ => {
                if !self.tokens.is_empty() {
                    warn!("discarding incomplete persisted session");
                    if let Err(e) = self.tokens.clear() {
                        error!(error = %e, "failed to clear session storage");
                    }
                }
                SessionState::Anonymous
            }
        };
        info!(authenticated = state.is_authenticated(), "session initialized");
        self.state.send_replace(state.clone());
        state
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Returns a receiver observing state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Returns true if a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Returns the signed-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Logs in, stores the session and navigates home.
    ///
    /// # Errors
    ///
    /// Returns the remote error, or a storage error if the session could not
    /// be saved. The state is left untouched on failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let response = self.auth.login(credentials).await?;
        let (tokens, user) = response.into_parts();
        self.tokens.store_session(&tokens, &user)?;

        info!(user_id = %user.id, "logged in");
        self.coordinator.notify(AuthEvent::LoggedIn {
            user_id: user.id.clone(),
        });
        self.state.send_replace(SessionState::Authenticated { user: user.clone() });
        self.navigator.navigate(Route::Home);
        Ok(user)
    }

    /// Registers an account. The account awaits email verification; no
    /// tokens are issued and the state does not change.
    ///
    /// # Errors
    ///
    /// Returns the remote error.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegistrationReceipt, SessionError> {
        let receipt = self.auth.register(registration).await?;
        info!(email = %receipt.email, "registration pending verification");
        Ok(receipt)
    }

    /// Logs out. The remote call is best-effort; the local session is always
    /// cleared.
    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            warn!(error = %e, "remote logout failed, clearing local session anyway");
        }
        if let Err(e) = self.tokens.clear() {
            error!(error = %e, "failed to clear session storage");
        }

        info!("logged out");
        self.coordinator.notify(AuthEvent::LoggedOut);
        self.state.send_replace(SessionState::Anonymous);
        self.navigator.navigate(Route::Home);
    }

    /// Re-fetches the profile and merges it into the cached user. Tokens are
    /// not touched.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session (or if the session ended
    /// while the profile was fetched), the remote error, or a storage error.
    pub async fn refresh_profile(&self) -> Result<User, SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }

        let profile = self.auth.profile().await?;

        let Some(mut user) = self.current_user() else {
            return Err(SessionError::NotAuthenticated);
        };
        user.merge_profile(profile);
        self.tokens.store_user(&user)?;
        self.state.send_replace(SessionState::Authenticated { user: user.clone() });
        Ok(user)
    }
}

impl SessionObserver for SessionContext {
    fn session_invalidated(&self, reason: &str) {
        warn!(reason, "session invalidated, redirecting to login");
        self.state.send_replace(SessionState::Anonymous);
        self.navigator.navigate(Route::Login);
    }
}
