//! Mailer that writes messages to the log instead of delivering them.

use async_trait::async_trait;

use super::service::{Email, MailError, Mailer};

/// Logs every message at `info` level (body at `debug`).
///
/// Used when no mail transport is configured, e.g. in development.
#[derive(Debug, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if !email.to.contains('@') {
            return Err(MailError::InvalidRecipient(email.to));
        }

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        tracing::debug!(body = %email.text, "Email body");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> Email {
        Email {
            to: to.to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_addresses() {
        assert!(LogMailer::new().send(email("a@b.io")).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_mailer_rejects_garbage_recipient() {
        let err = LogMailer::new().send(email("nobody")).await.unwrap_err();
        assert!(matches!(err, MailError::InvalidRecipient(_)));
    }
}
