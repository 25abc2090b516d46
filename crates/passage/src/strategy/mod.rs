// Strategies — pluggable verifiers, one per authentication method.
//
// Every strategy answers the same question through one seam: given a raw
// request, produce a `NormalizedCredential` or a typed failure. The set of
// strategies is closed (`StrategyId`), so dispatch cannot fail on an unknown
// name at runtime; an unregistered strategy is a configuration error caught
// by the authenticator.

use std::fmt;

use passage_core::error::{AuthError, AuthFailure};

use crate::provider::ProviderProfile;

mod form;
mod oauth;

pub use form::FormStrategy;
pub use oauth::OAuthStrategy;

/// The closed set of strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyId {
    Github,
    Google,
    Form,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Github => "github",
            StrategyId::Google => "google",
            StrategyId::Form => "form",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw proof carried by an inbound authentication request, already
/// lifted out of the transport.
#[derive(Debug, Clone)]
pub enum AuthRequest {
    /// An OAuth provider redirected back with an authorization code.
    OAuthCallback {
        code: String,
        state: Option<String>,
    },
    /// An email+password form submission.
    Form {
        action: String,
        email: String,
        password: String,
    },
}

/// What a form submission is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Login,
    Signup,
}

/// A validated form submission.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub action: FormAction,
    pub email: String,
    pub password: String,
}

/// A verified proof, normalized to one of the two shapes the resolution
/// layer understands.
#[derive(Debug, Clone)]
pub enum NormalizedCredential {
    Profile(ProviderProfile),
    Form(FormSubmission),
}

/// A registered authentication strategy.
#[derive(Clone)]
pub enum Strategy {
    OAuth(OAuthStrategy),
    Form(FormStrategy),
}

impl Strategy {
    pub fn id(&self) -> StrategyId {
        match self {
            Strategy::OAuth(s) => s.id(),
            Strategy::Form(_) => StrategyId::Form,
        }
    }

    /// Registration-time configuration check.
    pub fn validate(&self) -> Result<(), AuthFailure> {
        match self {
            Strategy::OAuth(s) => s.validate(),
            // The form strategy takes no external configuration.
            Strategy::Form(_) => Ok(()),
        }
    }

    /// Verify the request proof, yielding a normalized credential.
    pub async fn verify(&self, request: AuthRequest) -> Result<NormalizedCredential, AuthError> {
        match self {
            Strategy::OAuth(s) => s.verify(request).await,
            Strategy::Form(s) => s.verify(request),
        }
    }

    /// The provider redirect that initiates the flow, for strategies that
    /// have one.
    pub fn authorization_url(&self, state: &str) -> Option<String> {
        match self {
            Strategy::OAuth(s) => Some(s.authorization_url(state)),
            Strategy::Form(_) => None,
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Strategy").field(&self.id()).finish()
    }
}
