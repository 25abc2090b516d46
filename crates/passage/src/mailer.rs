// Outbound mail seam.
//
// The core never talks SMTP; it hands a recipient and a verification URL to
// whatever `Mailer` the embedding service wires in.

use async_trait::async_trait;

/// Errors from a mailer implementation.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Delivers verification email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, recipient: &str, verify_url: &str)
        -> Result<(), MailerError>;
}

/// Development mailer: logs the verification link instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(
        &self,
        recipient: &str,
        verify_url: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(%recipient, %verify_url, "verification email (log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_delivers() {
        let mailer = LogMailer::new();
        mailer
            .send_verification("a@x.com", "https://app.example/verify-email/tok")
            .await
            .unwrap();
    }
}
