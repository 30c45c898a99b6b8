//! Mailer that keeps sent messages in memory.

use async_trait::async_trait;
use std::sync::Mutex;

use super::service::{Email, MailError, Mailer};

/// Collects messages in an outbox; optionally fails every delivery.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<Email>>,
    failing: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails with [`MailError::Transport`].
    pub fn failing() -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Email> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// The most recently delivered message.
    pub fn last(&self) -> Option<Email> {
        self.sent().pop()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if self.failing {
            return Err(MailError::Transport("outbox disabled".to_string()));
        }

        self.outbox
            .lock()
            .map_err(|e| MailError::Transport(e.to_string()))?
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_mailer_records_messages() {
        let mailer = MemoryMailer::new();
        let email = Email {
            to: "a@b.io".to_string(),
            subject: "Reset".to_string(),
            text: "link".to_string(),
        };

        mailer.send(email.clone()).await.unwrap();

        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.last(), Some(email));
    }

    #[tokio::test]
    async fn test_failing_mailer() {
        let mailer = MemoryMailer::failing();
        let result = mailer
            .send(Email {
                to: "a@b.io".to_string(),
                subject: String::new(),
                text: String::new(),
            })
            .await;

        assert!(result.is_err());
        assert!(mailer.sent().is_empty());
    }
}
