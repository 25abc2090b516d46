// Email-verification token lifecycle: issue, send, consume.
//
// A token is a capability proving control of an email address. It lives on
// the credential account until consumed; consumption is atomic in the store,
// so a replayed link fails cleanly. Delivery is best-effort: a failed send
// is logged and swallowed, signup still resolves.

use std::sync::Arc;

use passage_core::error::{AuthError, AuthFailure};
use passage_core::models::{AccountId, User};
use passage_core::store::AuthStore;

use crate::crypto::generate_token;
use crate::mailer::Mailer;

/// Characters of entropy in an issued token (6 bits each).
const TOKEN_LENGTH: usize = 32;

pub struct VerificationTokenService {
    store: Arc<dyn AuthStore>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl VerificationTokenService {
    pub fn new(store: Arc<dyn AuthStore>, mailer: Arc<dyn Mailer>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            base_url: base_url.into(),
        }
    }

    /// Generate a fresh token and store it on the account.
    pub async fn issue(&self, account_id: &AccountId) -> Result<String, AuthError> {
        let token = generate_token(TOKEN_LENGTH);
        self.store
            .set_verification_token(account_id, &token)
            .await?;
        Ok(token)
    }

    /// The link a recipient clicks; the token round-trips exactly as issued.
    pub fn verification_url(&self, token: &str) -> String {
        format!("{}/verify-email/{}", self.base_url.trim_end_matches('/'), token)
    }

    /// Deliver the verification link. Best-effort: delivery failure is
    /// logged with the recipient and swallowed.
    pub async fn send(&self, email: &str, token: &str) {
        let url = self.verification_url(token);
        if let Err(error) = self.mailer.send_verification(email, &url).await {
            tracing::warn!(recipient = %email, %error, "verification email delivery failed");
        }
    }

    /// Consume a token: marks the owning user's email verified and clears
    /// the token in one atomic store update. A second consumption of the
    /// same token fails with `InvalidToken`.
    pub async fn consume(&self, token: &str) -> Result<User, AuthError> {
        match self
            .store
            .consume_verification_token(token, chrono::Utc::now())
            .await?
        {
            Some(user) => {
                tracing::debug!(user = %user.id, "email verified");
                Ok(user)
            }
            None => Err(AuthFailure::InvalidToken.into()),
        }
    }
}
