// Error taxonomy for the authentication core.
//
// Two channels: `AuthFailure` for recoverable, user-addressable outcomes of
// an authentication attempt, and `StoreError`/`CryptoError` (wrapped by
// `AuthError`) for fatal faults the surrounding service has to handle.
// `Display` strings are the user-facing messages: terse, and never carrying
// store or provider detail.

use crate::store::StoreError;

/// Why an authentication attempt did not produce a user.
///
/// `NotFound` and `InvalidCredentials` deliberately share one display string
/// so a login response cannot be used to probe which emails have accounts;
/// the variants stay distinct for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// Missing or invalid strategy configuration. Raised at registration
    /// time so a misconfigured process fails at startup, not at first login.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed or missing input fields; user-correctable.
    #[error("{0}")]
    Validation(String),

    /// The OAuth provider exchange failed. Detail is kept out of the
    /// message; it is available to logs through [`AuthFailure::detail`].
    #[error("authentication with the provider failed")]
    Provider(String),

    /// Duplicate signup attempt, or a store race already resolved elsewhere.
    #[error("user already exists, please use a different email")]
    Conflict(String),

    /// No matching user/credential pair.
    #[error("invalid email or password")]
    NotFound,

    /// Password check failed.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Login blocked until the email address is verified.
    #[error("email is not verified")]
    Unverified,

    /// Verification token unknown or already consumed.
    #[error("invalid token")]
    InvalidToken,
}

impl AuthFailure {
    /// Stable machine-readable code, for logs and structured responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unverified => "EMAIL_NOT_VERIFIED",
            Self::InvalidToken => "INVALID_TOKEN",
        }
    }

    /// Internal detail for variants that carry one. Never shown to users.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Configuration(d)
            | Self::Validation(d)
            | Self::Provider(d)
            | Self::Conflict(d) => Some(d),
            _ => None,
        }
    }

    /// Whether the attempt can be retried by correcting user input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}

/// Failures from the cryptographic primitives.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid password hash format")]
    MalformedHash,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Union error for fallible async paths through the core.
///
/// Typed authentication outcomes travel as `Failure`; unexpected faults
/// (store unreachable, corrupt hash) travel on their own variants so callers
/// can separate "tell the user" from "page someone".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Failure(#[from] AuthFailure),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl AuthError {
    /// The recoverable failure, if this is one.
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Failure(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_are_indistinguishable_to_users() {
        assert_eq!(
            AuthFailure::NotFound.to_string(),
            AuthFailure::InvalidCredentials.to_string()
        );
    }

    #[test]
    fn test_provider_detail_not_displayed() {
        let failure = AuthFailure::Provider("github returned 502".into());
        assert!(!failure.to_string().contains("502"));
        assert_eq!(failure.detail(), Some("github returned 502"));
    }

    #[test]
    fn test_codes_are_distinct_where_messages_are_not() {
        assert_ne!(
            AuthFailure::NotFound.code(),
            AuthFailure::InvalidCredentials.code()
        );
    }

    #[test]
    fn test_configuration_is_not_recoverable() {
        assert!(!AuthFailure::Configuration("missing client id".into()).is_recoverable());
        assert!(AuthFailure::Unverified.is_recoverable());
    }

    #[test]
    fn test_auth_error_unwraps_failure() {
        let err = AuthError::from(AuthFailure::InvalidToken);
        assert_eq!(err.failure(), Some(&AuthFailure::InvalidToken));

        let err = AuthError::from(StoreError::NotFound);
        assert!(err.failure().is_none());
    }
}
