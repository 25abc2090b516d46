// The authenticator — strategy registry and top-level entry points.
//
// The registry is populated once at startup and immutable afterwards:
// `register` takes `&mut self`, everything else takes `&self`, so a shared
// `Arc<Authenticator>` is safe to read from every request task without
// locking.

use std::collections::HashMap;

use passage_core::error::{AuthError, AuthFailure};
use passage_core::models::{SessionToken, User};
use passage_core::store::SessionStore;

use crate::linker::{AccountLinker, Resolution};
use crate::strategy::{AuthRequest, Strategy, StrategyId};

pub struct Authenticator {
    strategies: HashMap<StrategyId, Strategy>,
    linker: AccountLinker,
}

impl Authenticator {
    pub fn new(linker: AccountLinker) -> Self {
        Self {
            strategies: HashMap::new(),
            linker,
        }
    }

    /// Bind a strategy under its id.
    ///
    /// Fails with a configuration error if the id is already registered or
    /// the strategy's required configuration is incomplete — misconfiguration
    /// stops the process at startup, not at first use.
    pub fn register(&mut self, strategy: Strategy) -> Result<(), AuthFailure> {
        let id = strategy.id();
        if self.strategies.contains_key(&id) {
            return Err(AuthFailure::Configuration(format!(
                "strategy \"{id}\" is already registered"
            )));
        }
        strategy.validate()?;
        self.strategies.insert(id, strategy);
        Ok(())
    }

    pub fn is_registered(&self, id: StrategyId) -> bool {
        self.strategies.contains_key(&id)
    }

    /// The provider redirect that initiates an OAuth flow.
    ///
    /// Fails for unregistered strategies and for strategies that have no
    /// authorization step (the form strategy).
    pub fn authorization_url(
        &self,
        id: StrategyId,
        state: &str,
    ) -> Result<String, AuthFailure> {
        let strategy = self.strategies.get(&id).ok_or_else(|| {
            AuthFailure::Configuration(format!("strategy \"{id}\" is not registered"))
        })?;
        strategy.authorization_url(state).ok_or_else(|| {
            AuthFailure::Configuration(format!("strategy \"{id}\" has no authorization step"))
        })
    }

    /// Authenticate a request with the named strategy.
    ///
    /// Verification and resolution only — establishing the session from the
    /// resolved user is the caller's job (see [`Authenticator::assert_session`]).
    pub async fn authenticate(
        &self,
        id: StrategyId,
        request: AuthRequest,
    ) -> Result<Resolution, AuthError> {
        let strategy = self.strategies.get(&id).ok_or_else(|| {
            AuthFailure::Configuration(format!("strategy \"{id}\" is not registered"))
        })?;

        tracing::debug!(strategy = %id, "authenticating request");

        let result = async {
            let credential = strategy.verify(request).await?;
            self.linker.resolve(credential).await
        }
        .await;

        match &result {
            Ok(resolution) => {
                tracing::info!(strategy = %id, user = %resolution.user().id, "authentication resolved");
            }
            Err(AuthError::Failure(failure)) => {
                tracing::warn!(
                    strategy = %id,
                    code = failure.code(),
                    detail = failure.detail().unwrap_or_default(),
                    "authentication failed"
                );
            }
            Err(error) => {
                tracing::error!(strategy = %id, %error, "authentication aborted");
            }
        }

        result
    }

    /// Write the resolved user into the session. The caller commits the
    /// session to its transport (cookie, header) afterwards.
    pub async fn assert_session(
        &self,
        sessions: &dyn SessionStore,
        token: &SessionToken,
        user: &User,
    ) -> Result<(), AuthError> {
        sessions.set_user_id(token, &user.id).await?;
        Ok(())
    }

    /// Clear the user association from the session. Idempotent: a second
    /// call, or a call on a session that never had a user, is a no-op.
    pub async fn logout(
        &self,
        sessions: &dyn SessionStore,
        token: &SessionToken,
    ) -> Result<(), AuthError> {
        sessions.clear(token).await?;
        tracing::debug!("session cleared");
        Ok(())
    }
}
