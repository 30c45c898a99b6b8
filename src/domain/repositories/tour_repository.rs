//! Repository trait for tour data access.

use crate::domain::entities::{MonthlyPlan, NewTour, Tour, TourPatch, TourStats};
use crate::domain::query::{Page, QueryRequest};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for tours.
///
/// Secret tours (`secretTour = true`) are invisible to every read, update,
/// delete and aggregate operation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTourRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryTourRepository`] - in-memory store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Lists tours shaped by the request (filter, sort, projection, page).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed filter values or unknown fields.
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, request: QueryRequest) -> Result<Page, AppError>;

    /// Finds a tour by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Tour>, AppError>;

    /// Creates a new tour.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a tour with the same name exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_tour: NewTour) -> Result<Tour, AppError>;

    /// Partially updates a tour and bumps its version.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tour does not exist.
    /// Returns [`AppError::Validation`] on a duplicate name.
    async fn update(&self, id: i64, patch: TourPatch) -> Result<Tour, AppError>;

    /// Deletes a tour. Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Aggregates tours rated at least [`crate::domain::entities::STATS_MIN_RATING`]
    /// per difficulty, ordered by average rating ascending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn stats(&self) -> Result<Vec<TourStats>, AppError>;

    /// Counts tour start dates per month of `year`, ordered by month.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlan>, AppError>;

    /// Stores recalculated review statistics for a tour.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_rating_stats(
        &self,
        id: i64,
        quantity: i32,
        average: f64,
    ) -> Result<(), AppError>;

    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the store cannot be queried.
    async fn ping(&self) -> Result<(), AppError>;
}
