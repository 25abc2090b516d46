// GitHub provider client.
//
// Code exchange posts to the OAuth token endpoint with `Accept:
// application/json` (GitHub defaults to form-encoded responses otherwise),
// then fetches `/user`. GitHub profiles may hide the email, in which case the
// primary verified address from `/user/emails` is used.

use async_trait::async_trait;
use serde::Deserialize;

use passage_core::models::Provider;

use super::{build_authorization_url, ProviderClient, ProviderError, ProviderProfile, ProviderSettings};

const AUTHORIZE_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
const USER_ENDPOINT: &str = "https://api.github.com/user";
const EMAILS_ENDPOINT: &str = "https://api.github.com/user/emails";
const SCOPES: &str = "read:user user:email";
const USER_AGENT: &str = "passage";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    settings: ProviderSettings,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("code", code),
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

        token.access_token.ok_or_else(|| {
            ProviderError::Exchange(
                token
                    .error_description
                    .unwrap_or_else(|| "no access token in response".into()),
            )
        })
    }

    async fn fetch_primary_email(&self, access_token: &str) -> Result<String, ProviderError> {
        let emails: Vec<GithubEmail> = self
            .http
            .get(EMAILS_ENDPOINT)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email)
            .ok_or(ProviderError::MissingEmail)
    }
}

#[async_trait]
impl ProviderClient for GithubClient {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    fn authorization_url(&self, state: &str) -> String {
        build_authorization_url(AUTHORIZE_ENDPOINT, &self.settings, SCOPES, state)
    }

    async fn exchange(&self, code: &str) -> Result<ProviderProfile, ProviderError> {
        let access_token = self.fetch_access_token(code).await?;

        let user: GithubUser = self
            .http
            .get(USER_ENDPOINT)
            .bearer_auth(&access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        let email = match user.email {
            Some(email) => email,
            None => self.fetch_primary_email(&access_token).await?,
        };

        Ok(ProviderProfile {
            provider: Provider::Github,
            provider_account_id: user.id.to_string(),
            email,
            display_name: user.name.unwrap_or(user.login),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_points_at_github() {
        let client = GithubClient::new(ProviderSettings::new(
            "gh-id",
            "gh-secret",
            "https://app.example/auth/github/callback",
        ));
        let url = client.authorization_url("st-1");
        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert!(url.contains("scope=read%3Auser+user%3Aemail"));
    }

    #[test]
    fn test_token_response_shapes() {
        let ok: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t-1","token_type":"bearer"}"#).unwrap();
        assert_eq!(ok.access_token.as_deref(), Some("t-1"));

        let err: TokenResponse =
            serde_json::from_str(r#"{"error":"bad_verification_code","error_description":"The code is incorrect"}"#)
                .unwrap();
        assert!(err.access_token.is_none());
        assert_eq!(err.error_description.as_deref(), Some("The code is incorrect"));
    }
}
