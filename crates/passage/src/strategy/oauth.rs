// OAuth authorization-code strategy.
//
// Flow: `authorization_url` issues the redirect to the provider; the
// provider calls back with a code; `verify` exchanges the code through the
// `ProviderClient` and yields the normalized profile. Exchange failures are
// propagated as provider failures, never retried here.

use std::sync::Arc;

use passage_core::error::{AuthError, AuthFailure};
use passage_core::models::Provider;

use crate::provider::{GithubClient, GoogleClient, ProviderClient, ProviderSettings};

use super::{AuthRequest, NormalizedCredential, StrategyId};

#[derive(Clone)]
pub struct OAuthStrategy {
    provider: Provider,
    settings: ProviderSettings,
    client: Arc<dyn ProviderClient>,
}

impl OAuthStrategy {
    pub fn github(settings: ProviderSettings) -> Self {
        Self::with_client(
            Provider::Github,
            settings.clone(),
            Arc::new(GithubClient::new(settings)),
        )
    }

    pub fn google(settings: ProviderSettings) -> Self {
        Self::with_client(
            Provider::Google,
            settings.clone(),
            Arc::new(GoogleClient::new(settings)),
        )
    }

    /// Build a strategy around an arbitrary client. Used by tests to stand
    /// in a fake provider; the settings are still validated at registration.
    pub fn with_client(
        provider: Provider,
        settings: ProviderSettings,
        client: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            provider,
            settings,
            client,
        }
    }

    pub fn id(&self) -> StrategyId {
        match self.provider {
            Provider::Google => StrategyId::Google,
            // Email never constructs an OAuth strategy; validate() rejects it.
            Provider::Github | Provider::Email => StrategyId::Github,
        }
    }

    /// The provider redirect that starts the flow.
    pub fn authorization_url(&self, state: &str) -> String {
        self.client.authorization_url(state)
    }

    pub(crate) fn validate(&self) -> Result<(), AuthFailure> {
        if self.provider == Provider::Email {
            return Err(AuthFailure::Configuration(
                "the email provider is not an OAuth strategy".into(),
            ));
        }
        self.settings.validate(self.provider)
    }

    pub(crate) async fn verify(
        &self,
        request: AuthRequest,
    ) -> Result<NormalizedCredential, AuthError> {
        let (code, state) = match request {
            AuthRequest::OAuthCallback { code, state } => (code, state),
            AuthRequest::Form { .. } => {
                return Err(AuthFailure::Validation(
                    "expected an authorization callback, got form credentials".into(),
                )
                .into())
            }
        };

        if code.is_empty() {
            return Err(
                AuthFailure::Validation("authorization code must be provided".into()).into(),
            );
        }

        tracing::debug!(
            provider = %self.provider,
            state = state.as_deref().unwrap_or(""),
            "callback received, exchanging authorization code"
        );

        let profile = self.client.exchange(&code).await.map_err(|e| {
            tracing::warn!(provider = %self.provider, error = %e, "code exchange failed");
            AuthFailure::Provider(e.to_string())
        })?;

        tracing::debug!(
            provider = %self.provider,
            provider_account_id = %profile.provider_account_id,
            "authorization code exchanged"
        );

        Ok(NormalizedCredential::Profile(profile))
    }
}
