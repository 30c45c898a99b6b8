//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Tour`] - A bookable tour
//! - [`User`] - A registered user with a role
//! - [`Review`] - A user's rating of a tour
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! and partial updates (`NewTour`, `TourPatch`, ...). Each collection also
//! exports a static [`crate::domain::query::CollectionSchema`] describing its
//! queryable fields.

pub mod review;
pub mod tour;
pub mod user;

pub use review::{NewReview, RatingSummary, REVIEW_COLLECTION, Review};
pub use tour::{
    DEFAULT_RATING, Difficulty, MonthlyPlan, NewTour, STATS_MIN_RATING, TOUR_COLLECTION, Tour,
    TourPatch, TourStats, visible_tours,
};
pub use user::{NewUser, Role, USER_COLLECTION, User, UserPatch, active_users};
