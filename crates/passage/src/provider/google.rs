// Google provider client.
//
// Standard authorization-code flow against the OpenID Connect endpoints: the
// token exchange posts form-encoded credentials, the profile comes from the
// `userinfo` endpoint and is keyed by the stable `sub` claim.

use async_trait::async_trait;
use serde::Deserialize;

use passage_core::models::Provider;

use super::{build_authorization_url, ProviderClient, ProviderError, ProviderProfile, ProviderSettings};

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleClient {
    settings: ProviderSettings,
    http: reqwest::Client,
}

impl GoogleClient {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ProviderClient for GoogleClient {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn authorization_url(&self, state: &str) -> String {
        build_authorization_url(AUTHORIZE_ENDPOINT, &self.settings, SCOPES, state)
    }

    async fn exchange(&self, code: &str) -> Result<ProviderProfile, ProviderError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Exchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Exchange(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Exchange(e.to_string()))?;
        let access_token = token.access_token.ok_or_else(|| {
            ProviderError::Exchange(
                token
                    .error_description
                    .unwrap_or_else(|| "no access token in response".into()),
            )
        })?;

        let user: GoogleUser = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        let email = user.email.ok_or(ProviderError::MissingEmail)?;

        Ok(ProviderProfile {
            provider: Provider::Google,
            provider_account_id: user.sub,
            display_name: user.name.unwrap_or_else(|| email.clone()),
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_points_at_google() {
        let client = GoogleClient::new(ProviderSettings::new(
            "g-id",
            "g-secret",
            "https://app.example/auth/google/callback",
        ));
        let url = client.authorization_url("st-2");
        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_userinfo_shape() {
        let user: GoogleUser = serde_json::from_str(
            r#"{"sub":"108","email":"a@x.com","email_verified":true,"name":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(user.sub, "108");
        assert_eq!(user.email.as_deref(), Some("a@x.com"));
    }
}
