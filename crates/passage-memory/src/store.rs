// In-memory store — Vec-backed tables behind a `tokio::sync::RwLock`.
//
// Enforces the same uniqueness constraints a relational schema would:
// `user.email` and `(account.provider, account.provider_account_id)`.
// Violations surface as `StoreError::Duplicate`, which is exactly the signal
// the resolution layer's retry-as-lookup discipline relies on. Token
// consumption runs under the write lock, so concurrent consumption of the
// same token succeeds exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use passage_core::models::{Account, AccountId, Provider, SessionToken, User, UserId};
use passage_core::store::{AccountStore, SessionStore, StoreError, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    accounts: Vec<Account>,
}

/// In-memory user/account store.
///
/// Data is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users (for tests).
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored accounts (for tests).
    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }

    /// Drop all data.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.accounts.clear();
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Duplicate("user.email".into()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| {
            a.provider == account.provider && a.provider_account_id == account.provider_account_id
        }) {
            return Err(StoreError::Duplicate(
                "account.provider_account_id".into(),
            ));
        }
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_account(
        &self,
        provider: Provider,
        provider_account_id: &str,
    ) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn find_accounts_by_user(&self, user_id: &UserId) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_verification_token(
        &self,
        account_id: &AccountId,
        token: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| &a.id == account_id)
            .ok_or(StoreError::NotFound)?;
        account.verification_token = Some(token.to_string());
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_verification_token(
        &self,
        token: &str,
        verified_at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        // Single write lock covers the token clear and the user update, so a
        // second consumer of the same token observes the cleared column.
        let mut tables = self.tables.write().await;

        let user_id = match tables
            .accounts
            .iter_mut()
            .find(|a| a.verification_token.as_deref() == Some(token))
        {
            Some(account) => {
                account.verification_token = None;
                account.updated_at = verified_at;
                account.user_id.clone()
            }
            None => return Ok(None),
        };

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| {
                StoreError::Backend(format!("account references missing user {user_id}"))
            })?;
        user.email_verified_at = Some(verified_at);
        user.updated_at = verified_at;
        Ok(Some(user.clone()))
    }
}

/// In-memory session store: token → user id.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, UserId>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn user_id(&self, token: &SessionToken) -> Result<Option<UserId>, StoreError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn set_user_id(
        &self,
        token: &SessionToken,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(token.clone(), user_id.clone());
        Ok(())
    }

    async fn clear(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(User::new("a@x.com", "a")).await.unwrap();

        let err = store
            .create_user(User::new("A@X.COM", "shadow"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_provider_account_rejected() {
        let store = MemoryStore::new();
        let user = store.create_user(User::new("a@x.com", "a")).await.unwrap();

        store
            .create_account(Account::oauth(user.id.clone(), Provider::Github, "gh-1"))
            .await
            .unwrap();
        let err = store
            .create_account(Account::oauth(user.id.clone(), Provider::Github, "gh-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // Same provider id under a different provider is a distinct key.
        store
            .create_account(Account::oauth(user.id, Provider::Google, "gh-1"))
            .await
            .unwrap();
        assert_eq!(store.account_count().await, 2);
    }

    #[tokio::test]
    async fn test_consume_token_is_single_use() {
        let store = MemoryStore::new();
        let user = store.create_user(User::new("a@x.com", "a")).await.unwrap();
        let account = store
            .create_account(Account::credential(user.id.clone(), "salt:key"))
            .await
            .unwrap();
        store
            .set_verification_token(&account.id, "tok-123")
            .await
            .unwrap();

        let now = Utc::now();
        let verified = store
            .consume_verification_token("tok-123", now)
            .await
            .unwrap()
            .expect("first consumption succeeds");
        assert_eq!(verified.email_verified_at, Some(now));

        let replay = store
            .consume_verification_token("tok-123", Utc::now())
            .await
            .unwrap();
        assert!(replay.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_consume_succeeds_once() {
        let store = MemoryStore::new();
        let user = store.create_user(User::new("a@x.com", "a")).await.unwrap();
        let account = store
            .create_account(Account::credential(user.id.clone(), "salt:key"))
            .await
            .unwrap();
        store
            .set_verification_token(&account.id, "tok-race")
            .await
            .unwrap();

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .consume_verification_token("tok-race", Utc::now())
                    .await
                    .unwrap()
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .consume_verification_token("tok-race", Utc::now())
                    .await
                    .unwrap()
            })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(
            a.is_some() as u8 + b.is_some() as u8,
            1,
            "exactly one consumer wins"
        );
    }

    #[tokio::test]
    async fn test_session_clear_is_idempotent() {
        let sessions = MemorySessionStore::new();
        let token = SessionToken::new("s-1");

        sessions.clear(&token).await.unwrap();
        sessions
            .set_user_id(&token, &UserId::from("u-1"))
            .await
            .unwrap();
        sessions.clear(&token).await.unwrap();
        sessions.clear(&token).await.unwrap();
        assert!(sessions.user_id(&token).await.unwrap().is_none());
    }
}
