// Store traits — the seam between the authentication core and durable state.
//
// All exclusion is delegated to the store: the core never holds locks, and
// uniqueness constraints (`user.email`, `(account.provider,
// account.provider_account_id)`) are the authoritative guard against
// concurrent duplicate creation. A violated constraint surfaces as
// `StoreError::Duplicate`, which callers treat as "someone else got there
// first", not as a failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Account, AccountId, Provider, SessionToken, User, UserId};

/// Errors from a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated; names the constraint.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("record not found")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// User persistence operations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` if the email is taken.
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Lookup is case-insensitive: implementations match on the lowercased email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Account persistence operations, including the verification-token column.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `Duplicate` if
    /// `(provider, provider_account_id)` is already linked.
    async fn create_account(&self, account: Account) -> Result<Account, StoreError>;

    async fn find_account(
        &self,
        provider: Provider,
        provider_account_id: &str,
    ) -> Result<Option<Account>, StoreError>;

    async fn find_accounts_by_user(&self, user_id: &UserId) -> Result<Vec<Account>, StoreError>;

    /// Store a fresh verification token on the account.
    async fn set_verification_token(
        &self,
        account_id: &AccountId,
        token: &str,
    ) -> Result<(), StoreError>;

    /// Atomically consume a verification token: locate the account holding
    /// `token`, clear the token, stamp the owning user's `email_verified_at`
    /// with `verified_at`, and return that user. Returns `None` when no
    /// account holds the token (unknown or already consumed). Implementations
    /// must guarantee that concurrent consumption of the same token succeeds
    /// exactly once.
    async fn consume_verification_token(
        &self,
        token: &str,
        verified_at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;
}

/// Combined store surface the resolution layer works against.
pub trait AuthStore: UserStore + AccountStore {}

impl<T: UserStore + AccountStore> AuthStore for T {}

/// Minimal session contract: an opaque token mapped to a user id.
///
/// The session layer itself (cookies, expiry, serialization) is external; the
/// core only writes the association after a successful resolution and clears
/// it on logout.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn user_id(&self, token: &SessionToken) -> Result<Option<UserId>, StoreError>;

    async fn set_user_id(&self, token: &SessionToken, user_id: &UserId)
        -> Result<(), StoreError>;

    /// Remove the user association. Idempotent: clearing an empty or unknown
    /// session is a no-op, never an error.
    async fn clear(&self, token: &SessionToken) -> Result<(), StoreError>;
}
