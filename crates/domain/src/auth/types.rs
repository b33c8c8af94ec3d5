//! Authentication types

use serde::{Deserialize, Serialize};

use crate::user::User;

/// The access/refresh credential pair of a logged-in session.
///
/// Both tokens are opaque strings; expiry is tracked by the server only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived credential authorizing API requests.
    pub access_token: String,
    /// Longer-lived credential used to mint a new access token.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a new token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Tokens returned by the refresh endpoint.
///
/// `refresh_token` is present only when the server rotates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    /// The newly minted access token.
    pub access_token: String,
    /// The rotated refresh token, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Login credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Email, phone number or username.
    pub identifier: String,
    /// Plain-text password, sent over TLS only.
    pub password: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    #[must_use]
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account registration data.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Email address; a verification mail is sent here.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .finish()
    }
}

/// Result of a registration: the account awaits email verification and
/// no tokens are issued yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Email the verification was sent to.
    pub email: String,
    /// Registered display name.
    pub name: String,
}

/// Body returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The authenticated user.
    pub user: User,
    /// Access token.
    pub token: String,
    /// Refresh token.
    pub refresh_token: String,
}

impl LoginResponse {
    /// Splits the response into the token pair and the user.
    #[must_use]
    pub fn into_parts(self) -> (TokenPair, User) {
        (TokenPair::new(self.token, self.refresh_token), self.user)
    }
}

/// Events emitted by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A login completed and the session was stored.
    LoggedIn {
        /// Identifier of the user.
        user_id: String,
    },
    /// The session was cleared by an explicit logout.
    LoggedOut,
    /// The access token was refreshed.
    TokenRefreshed {
        /// Preview of the new token.
        token_preview: String,
    },
    /// The session could not be recovered and was cleared.
    SessionInvalidated {
        /// Human-readable cause.
        reason: String,
    },
}

/// Returns a preview of a token suitable for logs: at most the first 8
/// chars, followed by `...`.
#[must_use]
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(8).collect();
    format!("{head}...")
}
