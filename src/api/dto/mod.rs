//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Request bodies use the camelCase field names of the
//! public API.

pub mod health;
pub mod response;
pub mod review;
pub mod tour;
pub mod user;
