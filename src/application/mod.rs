//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::tour_service::TourService`] - Tour listing, maintenance and aggregates
//! - [`services::review_service::ReviewService`] - Reviews and tour rating bookkeeping
//! - [`services::user_service::UserService`] - User profiles
//! - [`services::auth_service::AuthService`] - Passwords, JWTs and password resets

pub mod services;
