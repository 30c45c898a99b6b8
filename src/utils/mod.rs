//! Utility functions shared across layers.
//!
//! - [`slug`] - Tour name to URL slug
//! - [`reset_token`] - Password reset token generation and hashing

pub mod reset_token;
pub mod slug;
