//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence` (PostgreSQL)
//!   and `crate::infrastructure::memory` (in-process store)
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`TourRepository`] - Tour CRUD, listing and aggregates
//! - [`UserRepository`] - User accounts and credentials
//! - [`ReviewRepository`] - Reviews and rating summaries

pub mod review_repository;
pub mod tour_repository;
pub mod user_repository;

pub use review_repository::ReviewRepository;
pub use tour_repository::TourRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use review_repository::MockReviewRepository;
#[cfg(test)]
pub use tour_repository::MockTourRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
