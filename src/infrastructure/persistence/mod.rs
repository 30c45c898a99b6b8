//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. List
//! queries go through [`PgCollectionQuery`], which renders the shaped query
//! with `sqlx::QueryBuilder` and binds every value.
//!
//! # Repositories
//!
//! - [`PgTourRepository`] - Tours, aggregates and rating maintenance
//! - [`PgUserRepository`] - User accounts and credentials
//! - [`PgReviewRepository`] - Reviews and rating summaries

pub mod pg_collection_query;
pub mod pg_review_repository;
pub mod pg_tour_repository;
pub mod pg_user_repository;

pub use pg_collection_query::PgCollectionQuery;
pub use pg_review_repository::PgReviewRepository;
pub use pg_tour_repository::PgTourRepository;
pub use pg_user_repository::PgUserRepository;
