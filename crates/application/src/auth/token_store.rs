//! Persistent token storage.
//!
//! This module keeps the session's token pair and cached user in a
//! [`KeyValueStore`] under fixed keys. Tokens are opaque; no expiry is
//! tracked locally.

use std::sync::Arc;

use prepdesk_domain::{RefreshedTokens, TokenPair, User};
use tracing::warn;

use crate::ports::{KeyValueStore, StorageError};

/// Key of the access token.
pub const AUTH_TOKEN_KEY: &str = "AUTH_TOKEN";
/// Key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "REFRESH_TOKEN";
/// Key of the cached user JSON blob.
pub const USER_KEY: &str = "USER";

/// Session token store shared by the pipeline, coordinator and session.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_tokens", &self.has_tokens())
            .finish()
    }
}

impl TokenStore {
    /// Creates a token store over the given key-value store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads a key, treating storage failures as absent.
    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read from session storage");
                None
            }
        }
    }

    /// Returns the stored access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(AUTH_TOKEN_KEY)
    }

    /// Returns the stored refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Returns the token pair if both tokens are present.
    #[must_use]
    pub fn tokens(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
        })
    }

    /// Returns true if both tokens are present.
    #[must_use]
    pub fn has_tokens(&self) -> bool {
        self.tokens().is_some()
    }

    /// Returns true if neither token nor user is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token().is_none() && self.refresh_token().is_none() && self.read(USER_KEY).is_none()
    }

    /// Returns the cached user. A corrupt blob is treated as absent.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "discarding unreadable cached user");
                None
            }
        }
    }

    /// Stores a token pair together with the user it belongs to.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn store_session(&self, tokens: &TokenPair, user: &User) -> Result<(), StorageError> {
        self.store.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
        self.store_user(user)
    }

    /// Stores the result of a refresh: the access token is replaced and the
    /// refresh token only if the server rotated it.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn store_refreshed(&self, tokens: &RefreshedTokens) -> Result<(), StorageError> {
        self.store.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
        if let Some(refresh_token) = &tokens.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(())
    }

    /// Replaces the cached user.
    ///
    /// # Errors
    /// Returns an error if the user cannot be serialized or written.
    pub fn store_user(&self, user: &User) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(user).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(USER_KEY, &json)
    }

    /// Clears the whole store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.clear()
    }
}
