//! User and profile types

use serde::{Deserialize, Serialize};

/// The cached user of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-side identifier.
    pub id: String,
    /// Login identifier (email, phone or username).
    pub identifier: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Granted roles.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    /// Creates a user with no optional fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            name: None,
            email: None,
            roles: Vec::new(),
        }
    }

    /// Returns true if the user has the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Merges a freshly fetched profile into this user.
    ///
    /// Server fields overwrite the cached ones; locally cached fields the
    /// profile does not carry are kept.
    pub fn merge_profile(&mut self, profile: Profile) {
        self.id = profile.id;
        self.identifier = profile.identifier;
        self.roles = profile.roles;
        if profile.name.is_some() {
            self.name = profile.name;
        }
        if profile.email.is_some() {
            self.email = profile.email;
        }
    }
}

/// Body of `GET /auth/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Server-side identifier.
    pub id: String,
    /// Login identifier.
    pub identifier: String,
    /// Granted roles.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Display name, when the server includes it.
    #[serde(default)]
    pub name: Option<String>,
    /// Email, when the server includes it.
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_profile_keeps_local_fields() {
        let mut user = User::new("u-1", "ada");
        user.name = Some("Ada".to_string());
        user.roles = vec!["student".to_string()];

        user.merge_profile(Profile {
            id: "u-1".to_string(),
            identifier: "ada@example.com".to_string(),
            roles: vec!["student".to_string(), "counsellee".to_string()],
            name: None,
            email: Some("ada@example.com".to_string()),
        });

        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.identifier, "ada@example.com");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(user.has_role("counsellee"));
    }
}
