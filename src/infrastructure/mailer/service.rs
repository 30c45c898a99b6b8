//! Mailer trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while delivering an email.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Outbound email delivery.
///
/// # Implementations
///
/// - [`crate::infrastructure::mailer::LogMailer`] - writes messages to the log
/// - [`crate::infrastructure::mailer::MemoryMailer`] - keeps messages in memory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] when the message could not be handed off.
    async fn send(&self, email: Email) -> Result<(), MailError>;
}
