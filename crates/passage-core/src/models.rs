// Data models for the authentication core.
//
// A `User` is the canonical identity; every authentication method a user has
// proven control of is one `Account` row bound to that user. The pair
// (provider, provider_account_id) is the linking key and is globally unique,
// which is what keeps repeated logins from forking identities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Authentication providers understood by the core.
///
/// A closed set: adding a provider is a code change, not configuration, so an
/// unknown provider string can never reach the resolution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Google,
    /// The email+password credential method.
    Email,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Google => "google",
            Provider::Email => "email",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical identity record.
///
/// Created on first successful resolution from any strategy; never deleted by
/// this core. `email_verified_at` is set exactly once, when a verification
/// token is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Unique, stored lowercased.
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            email: email.into().to_lowercase(),
            name: name.into(),
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// One authentication method bound to a user.
///
/// OAuth accounts carry the provider's user id as `provider_account_id`;
/// credential accounts use the owning user's id there (one credential account
/// per user at most) and carry the password hash and, until consumed, the
/// email-verification token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub provider: Provider,
    pub provider_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// An account linking an OAuth provider identity to `user_id`.
    pub fn oauth(user_id: UserId, provider: Provider, provider_account_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::generate(),
            user_id,
            provider,
            provider_account_id: provider_account_id.into(),
            password_hash: None,
            verification_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An email+password credential account for `user_id`.
    pub fn credential(user_id: UserId, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        let provider_account_id = user_id.as_str().to_string();
        Self {
            id: AccountId::generate(),
            user_id,
            provider: Provider::Email,
            provider_account_id,
            password_hash: Some(password_hash.into()),
            verification_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Opaque session token, owned by the external session layer.
///
/// The core never inspects the token; it only keys the session store with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
