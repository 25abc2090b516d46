// Account linking — the identity-resolution algorithm.
//
// One email resolves to one canonical user no matter which strategy proved
// it. The store's uniqueness constraints are the only guard against
// concurrent first-time logins: a lost create race surfaces as
// `StoreError::Duplicate` and is settled by re-reading, never by failing the
// caller. Idempotency, not rollback, is the recovery mechanism throughout.

use std::sync::Arc;

use passage_core::error::{AuthError, AuthFailure};
use passage_core::models::{Account, Provider, User};
use passage_core::store::{AuthStore, StoreError};

use crate::crypto::PasswordHasher;
use crate::provider::ProviderProfile;
use crate::strategy::{FormAction, FormSubmission, NormalizedCredential};
use crate::verification::VerificationTokenService;

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The user is fully authenticated; the caller may establish a session.
    Authenticated(User),
    /// The user was signed up but must verify their email before logging in.
    /// A soft success: the caller renders "check your email", not an error.
    PendingVerification(User),
}

impl Resolution {
    pub fn user(&self) -> &User {
        match self {
            Resolution::Authenticated(user) | Resolution::PendingVerification(user) => user,
        }
    }
}

pub struct AccountLinker {
    store: Arc<dyn AuthStore>,
    hasher: Arc<dyn PasswordHasher>,
    verification: VerificationTokenService,
}

impl AccountLinker {
    pub fn new(
        store: Arc<dyn AuthStore>,
        hasher: Arc<dyn PasswordHasher>,
        verification: VerificationTokenService,
    ) -> Self {
        Self {
            store,
            hasher,
            verification,
        }
    }

    /// Resolve a verified credential to a canonical user.
    pub async fn resolve(&self, credential: NormalizedCredential) -> Result<Resolution, AuthError> {
        match credential {
            NormalizedCredential::Profile(profile) => {
                let user = self.resolve_oauth(profile).await?;
                Ok(Resolution::Authenticated(user))
            }
            NormalizedCredential::Form(submission) => self.resolve_form(submission).await,
        }
    }

    /// Resolve an OAuth profile: find-or-create the user by email, then
    /// link the `(provider, provider_account_id)` pair if it is not already
    /// linked. Calling this twice with the same profile is a no-op the
    /// second time; a different provider reporting the same email links to
    /// the existing user instead of forking identity.
    pub async fn resolve_oauth(&self, profile: ProviderProfile) -> Result<User, AuthError> {
        let email = profile.email.to_lowercase();
        let user = self
            .find_or_create_user(&email, &profile.display_name)
            .await?;

        if self
            .store
            .find_account(profile.provider, &profile.provider_account_id)
            .await?
            .is_none()
        {
            let account = Account::oauth(
                user.id.clone(),
                profile.provider,
                &profile.provider_account_id,
            );
            match self.store.create_account(account).await {
                Ok(_) => {
                    tracing::debug!(
                        provider = %profile.provider,
                        user = %user.id,
                        "linked new provider account"
                    );
                }
                // A concurrent login linked it first; already satisfied.
                Err(StoreError::Duplicate(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(user)
    }

    /// Resolve a form submission along its signup/login branch.
    pub async fn resolve_form(&self, submission: FormSubmission) -> Result<Resolution, AuthError> {
        let email = submission.email.to_lowercase();
        match submission.action {
            FormAction::Signup => self.signup(&email, &submission.password).await,
            FormAction::Login => self.login(&email, &submission.password).await,
        }
    }

    async fn signup(&self, email: &str, password: &str) -> Result<Resolution, AuthError> {
        if let Some(existing) = self.store.find_user_by_email(email).await? {
            let accounts = self.store.find_accounts_by_user(&existing.id).await?;
            if accounts.iter().any(|a| a.provider == Provider::Email) {
                return Err(AuthFailure::Conflict(format!(
                    "email {email} already has a credential account"
                ))
                .into());
            }
        }

        // Hash before creating anything so a hashing failure leaves no
        // orphaned records.
        let password_hash = self.hasher.hash(password)?;

        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = self.find_or_create_user(email, &name).await?;

        let account = Account::credential(user.id.clone(), password_hash);
        let account = match self.store.create_account(account).await {
            Ok(account) => account,
            // Two signups raced; the other one owns the credential now.
            Err(StoreError::Duplicate(_)) => {
                return Err(AuthFailure::Conflict(format!(
                    "email {email} already has a credential account"
                ))
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.verification.issue(&account.id).await?;
        self.verification.send(&user.email, &token).await;

        Ok(Resolution::PendingVerification(user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Resolution, AuthError> {
        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => user,
            None => return Err(AuthFailure::NotFound.into()),
        };

        let accounts = self.store.find_accounts_by_user(&user.id).await?;
        let credential = match accounts.iter().find(|a| a.provider == Provider::Email) {
            Some(account) => account,
            None => return Err(AuthFailure::NotFound.into()),
        };

        if !user.is_verified() {
            return Err(AuthFailure::Unverified.into());
        }

        let hash = credential
            .password_hash
            .as_deref()
            .ok_or(AuthFailure::InvalidCredentials)?;
        if !self.hasher.verify(hash, password)? {
            return Err(AuthFailure::InvalidCredentials.into());
        }

        Ok(Resolution::Authenticated(user))
    }

    /// Lookup by email, creating on absence. Losing the create race to a
    /// concurrent request is settled by re-reading the winner's row.
    async fn find_or_create_user(&self, email: &str, name: &str) -> Result<User, AuthError> {
        if let Some(user) = self.store.find_user_by_email(email).await? {
            return Ok(user);
        }

        match self.store.create_user(User::new(email, name)).await {
            Ok(user) => Ok(user),
            Err(StoreError::Duplicate(_)) => self
                .store
                .find_user_by_email(email)
                .await?
                .ok_or_else(|| {
                    AuthError::Store(StoreError::Backend(format!(
                        "user {email} vanished after losing a create race"
                    )))
                }),
            Err(e) => Err(e.into()),
        }
    }
}
