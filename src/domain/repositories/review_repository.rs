//! Repository trait for tour reviews.

use crate::domain::entities::{NewReview, RatingSummary, Review};
use crate::domain::query::{Page, QueryRequest};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for reviews.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgReviewRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryReviewRepository`] - in-memory store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Lists reviews shaped by the request, restricted to one tour when
    /// `tour_id` is set. Each document embeds its author as `user`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed filter values or unknown fields.
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, request: QueryRequest, tour_id: Option<i64>) -> Result<Page, AppError>;

    /// Creates a review.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the user already reviewed the tour.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_review: NewReview) -> Result<Review, AppError>;

    /// Counts the reviews of a tour and averages their ratings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn rating_summary(&self, tour_id: i64) -> Result<RatingSummary, AppError>;
}
