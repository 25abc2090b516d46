// Email+password form strategy.
//
// Single-shot validation, no multi-step state: all three fields must be
// present and the action must be one of "login"/"signup". Credential checks
// happen later, in the resolution layer — this strategy only establishes
// that the submission is well-formed.

use passage_core::error::{AuthError, AuthFailure};

use super::{AuthRequest, FormAction, FormSubmission, NormalizedCredential};

#[derive(Debug, Clone, Copy, Default)]
pub struct FormStrategy;

impl FormStrategy {
    pub fn new() -> Self {
        Self
    }

    pub fn verify(&self, request: AuthRequest) -> Result<NormalizedCredential, AuthError> {
        let (action, email, password) = match request {
            AuthRequest::Form {
                action,
                email,
                password,
            } => (action, email, password),
            AuthRequest::OAuthCallback { .. } => {
                return Err(AuthFailure::Validation(
                    "expected form credentials, got an authorization callback".into(),
                )
                .into())
            }
        };

        if email.trim().is_empty() {
            return Err(AuthFailure::Validation("email must be provided".into()).into());
        }
        if password.is_empty() {
            return Err(AuthFailure::Validation("password must be provided".into()).into());
        }

        let action = match action.as_str() {
            "login" => FormAction::Login,
            "signup" => FormAction::Signup,
            _ => {
                return Err(AuthFailure::Validation(
                    "action must be \"login\" or \"signup\"".into(),
                )
                .into())
            }
        };

        Ok(NormalizedCredential::Form(FormSubmission {
            action,
            email,
            password,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(action: &str, email: &str, password: &str) -> AuthRequest {
        AuthRequest::Form {
            action: action.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_valid_submission_normalizes() {
        let credential = FormStrategy::new()
            .verify(form("signup", "a@x.com", "hunter2"))
            .unwrap();
        match credential {
            NormalizedCredential::Form(sub) => {
                assert_eq!(sub.action, FormAction::Signup);
                assert_eq!(sub.email, "a@x.com");
            }
            other => panic!("unexpected credential: {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        for request in [
            form("login", "", "hunter2"),
            form("login", "   ", "hunter2"),
            form("login", "a@x.com", ""),
            form("reset", "a@x.com", "hunter2"),
        ] {
            let err = FormStrategy::new().verify(request).unwrap_err();
            assert!(matches!(
                err.failure(),
                Some(AuthFailure::Validation(_))
            ));
        }
    }

    #[test]
    fn test_callback_request_rejected() {
        let err = FormStrategy::new()
            .verify(AuthRequest::OAuthCallback {
                code: "c".into(),
                state: None,
            })
            .unwrap_err();
        assert!(matches!(err.failure(), Some(AuthFailure::Validation(_))));
    }
}
