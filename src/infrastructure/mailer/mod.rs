//! Outbound email.
//!
//! Provides a [`Mailer`] trait with two implementations:
//! - [`LogMailer`] - logs messages (no transport configured)
//! - [`MemoryMailer`] - in-memory outbox for tests and local runs

mod log_mailer;
mod memory_mailer;
mod service;

pub use log_mailer::LogMailer;
pub use memory_mailer::MemoryMailer;
pub use service::{Email, MailError, Mailer};

#[cfg(test)]
pub use service::MockMailer;
