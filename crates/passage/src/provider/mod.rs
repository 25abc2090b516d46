// OAuth provider clients.
//
// `ProviderClient` is the only coupling to a provider's wire protocol: it
// turns an authorization code into a normalized profile. Everything upstream
// (strategy dispatch, account linking) is provider-agnostic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use passage_core::error::AuthFailure;
use passage_core::models::Provider;

mod github;
mod google;

pub use github::GithubClient;
pub use google::GoogleClient;

/// Provider-agnostic profile produced from a raw OAuth profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub provider: Provider,
    /// The provider's own identifier for this user (e.g. GitHub id, Google sub).
    pub provider_account_id: String,
    pub email: String,
    pub display_name: String,
}

/// Errors from the provider exchange. Messages here are internal — the
/// user-facing rendering is the generic `AuthFailure::Provider` text.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("profile fetch failed: {0}")]
    Profile(String),

    #[error("provider returned no usable email address")]
    MissingEmail,
}

/// A client for one OAuth provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// The URL to redirect the user to for authorization.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a normalized profile.
    ///
    /// Failures are propagated, not retried; retries are a transport concern.
    async fn exchange(&self, code: &str) -> Result<ProviderProfile, ProviderError>;
}

/// Registration configuration for an OAuth provider.
///
/// All three values are mandatory; [`ProviderSettings::validate`] runs at
/// strategy registration so a missing credential stops the process at
/// startup instead of failing the first login.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl ProviderSettings {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Read settings for `provider` from the environment:
    /// `{PROVIDER}_CLIENT_ID`, `{PROVIDER}_CLIENT_SECRET`, and
    /// `PASSAGE_BASE_URL` for the callback.
    pub fn from_env(provider: Provider) -> Result<Self, AuthFailure> {
        let prefix = match provider {
            Provider::Github => "GITHUB",
            Provider::Google => "GOOGLE",
            Provider::Email => {
                return Err(AuthFailure::Configuration(
                    "the email provider takes no OAuth settings".into(),
                ))
            }
        };

        let require = |name: String| {
            std::env::var(&name)
                .map_err(|_| AuthFailure::Configuration(format!("{name} must be set")))
        };

        let client_id = require(format!("{prefix}_CLIENT_ID"))?;
        let client_secret = require(format!("{prefix}_CLIENT_SECRET"))?;
        let base_url = passage_core::env::base_url_from_env()
            .ok_or_else(|| AuthFailure::Configuration("PASSAGE_BASE_URL must be set".into()))?;
        let redirect_uri = format!(
            "{}/auth/{}/callback",
            base_url.trim_end_matches('/'),
            provider
        );

        Ok(Self::new(client_id, client_secret, redirect_uri))
    }

    /// Check all mandatory values are present.
    pub fn validate(&self, provider: Provider) -> Result<(), AuthFailure> {
        let missing = if self.client_id.is_empty() {
            Some("client id")
        } else if self.client_secret.is_empty() {
            Some("client secret")
        } else if self.redirect_uri.is_empty() {
            Some("redirect URI")
        } else {
            None
        };

        match missing {
            Some(field) => Err(AuthFailure::Configuration(format!(
                "{provider} strategy is missing its {field}"
            ))),
            None => Ok(()),
        }
    }
}

/// Build an authorization URL from an endpoint and the standard query pairs.
pub(crate) fn build_authorization_url(
    endpoint: &str,
    settings: &ProviderSettings,
    scope: &str,
    state: &str,
) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", &settings.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", scope)
        .append_pair("state", state)
        .finish();
    format!("{endpoint}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProviderSettings {
        ProviderSettings::new("id", "secret", "https://app.example/auth/github/callback")
    }

    #[test]
    fn test_validate_accepts_complete_settings() {
        assert!(settings().validate(Provider::Github).is_ok());
    }

    #[test]
    fn test_validate_names_the_missing_field() {
        let mut s = settings();
        s.client_secret.clear();
        let err = s.validate(Provider::Github).unwrap_err();
        assert!(matches!(err, AuthFailure::Configuration(_)));
        assert!(err.detail().unwrap().contains("client secret"));
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let url = build_authorization_url(
            "https://github.com/login/oauth/authorize",
            &settings(),
            "read:user user:email",
            "st-123",
        );
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("state=st-123"));
        assert!(url.contains("client_id=id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example%2Fauth%2Fgithub%2Fcallback"));
    }

    #[test]
    fn test_provider_error_messages() {
        let err = ProviderError::Exchange("503 from token endpoint".into());
        assert!(err.to_string().contains("token exchange failed"));
    }

    #[test]
    fn test_email_provider_has_no_oauth_settings() {
        let err = ProviderSettings::from_env(Provider::Email).unwrap_err();
        assert!(matches!(err, AuthFailure::Configuration(_)));
    }
}
