//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and mail delivery.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - In-process repositories with the same query semantics
//! - [`mailer`] - Outgoing mail (logging and in-memory implementations)

pub mod mailer;
pub mod memory;
pub mod persistence;
