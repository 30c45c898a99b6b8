//! Review service: creation and tour rating bookkeeping.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{DEFAULT_RATING, NewReview, Review};
use crate::domain::query::{Page, QueryRequest};
use crate::domain::repositories::{ReviewRepository, TourRepository};
use crate::error::AppError;

/// Service for listing and creating reviews.
///
/// Every saved review triggers a recalculation of the reviewed tour's
/// `ratingsQuantity` and `ratingsAverage`.
pub struct ReviewService<R: ReviewRepository + ?Sized, T: TourRepository + ?Sized> {
    review_repository: Arc<R>,
    tour_repository: Arc<T>,
}

impl<R: ReviewRepository + ?Sized, T: TourRepository + ?Sized> ReviewService<R, T> {
    pub fn new(review_repository: Arc<R>, tour_repository: Arc<T>) -> Self {
        Self {
            review_repository,
            tour_repository,
        }
    }

    /// Lists reviews, restricted to one tour when `tour_id` is set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed filter values or unknown fields.
    pub async fn list_reviews(
        &self,
        request: QueryRequest,
        tour_id: Option<i64>,
    ) -> Result<Page, AppError> {
        self.review_repository.list(request, tour_id).await
    }

    /// Creates a review and refreshes the tour's rating statistics.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tour does not exist.
    /// Returns [`AppError::Validation`] if the user already reviewed this tour.
    pub async fn create_review(&self, new_review: NewReview) -> Result<Review, AppError> {
        let tour_id = new_review.tour_id;

        if self.tour_repository.find_by_id(tour_id).await?.is_none() {
            return Err(AppError::not_found(
                "No tour found with that ID",
                json!({ "id": tour_id }),
            ));
        }

        let review = self.review_repository.create(new_review).await?;
        self.refresh_tour_rating(tour_id).await?;

        tracing::info!(
            review_id = review.id,
            tour_id,
            user_id = review.user_id,
            "Review created"
        );
        Ok(review)
    }

    /// Recomputes review count and mean rating for a tour.
    ///
    /// A tour without reviews falls back to 0 reviews and [`DEFAULT_RATING`].
    pub async fn refresh_tour_rating(&self, tour_id: i64) -> Result<(), AppError> {
        let summary = self.review_repository.rating_summary(tour_id).await?;

        let (quantity, average) = match summary.average {
            Some(average) if summary.quantity > 0 => {
                (i32::try_from(summary.quantity).unwrap_or(i32::MAX), average)
            }
            _ => (0, DEFAULT_RATING),
        };

        tracing::debug!(tour_id, quantity, average, "Refreshing tour rating");
        self.tour_repository
            .update_rating_stats(tour_id, quantity, average)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Difficulty, RatingSummary, Tour};
    use crate::domain::repositories::{MockReviewRepository, MockTourRepository};
    use chrono::Utc;

    fn create_test_tour(id: i64) -> Tour {
        let now = Utc::now();
        Tour {
            id,
            name: "The Wine Taster".to_string(),
            slug: "the-wine-taster".to_string(),
            duration: 3,
            difficulty: Difficulty::Easy,
            rating: 4.5,
            ratings_average: 4.5,
            ratings_quantity: 0,
            max_group_size: 8,
            price: 1997.0,
            price_discount: None,
            summary: None,
            description: None,
            image_cover: "cover.jpg".to_string(),
            images: Vec::new(),
            start_dates: Vec::new(),
            secret_tour: false,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    fn new_review(tour_id: i64) -> NewReview {
        NewReview {
            review: "Amazing!".to_string(),
            rating: 5,
            tour_id,
            user_id: 7,
        }
    }

    fn stored_review(new: NewReview) -> Review {
        let now = Utc::now();
        Review {
            id: 1,
            review: new.review,
            rating: new.rating,
            tour_id: new.tour_id,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_create_review_recalculates_rating() {
        let mut reviews = MockReviewRepository::new();
        let mut tours = MockTourRepository::new();

        tours
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(create_test_tour(id))));
        reviews
            .expect_create()
            .times(1)
            .returning(|new| Ok(stored_review(new)));
        reviews.expect_rating_summary().times(1).returning(|_| {
            Ok(RatingSummary {
                quantity: 2,
                average: Some(4.0),
            })
        });
        tours
            .expect_update_rating_stats()
            .withf(|id, quantity, average| *id == 3 && *quantity == 2 && *average == 4.0)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = ReviewService::new(Arc::new(reviews), Arc::new(tours));
        let review = service.create_review(new_review(3)).await.unwrap();

        assert_eq!(review.tour_id, 3);
    }

    #[tokio::test]
    async fn test_create_review_for_missing_tour() {
        let mut reviews = MockReviewRepository::new();
        let mut tours = MockTourRepository::new();

        tours.expect_find_by_id().returning(|_| Ok(None));
        reviews.expect_create().times(0);

        let service = ReviewService::new(Arc::new(reviews), Arc::new(tours));
        let result = service.create_review(new_review(42)).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_review_does_not_touch_rating() {
        let mut reviews = MockReviewRepository::new();
        let mut tours = MockTourRepository::new();

        tours
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_tour(id))));
        reviews.expect_create().returning(|_| {
            Err(AppError::bad_request(
                "Duplicate field value entered",
                json!({}),
            ))
        });
        tours.expect_update_rating_stats().times(0);

        let service = ReviewService::new(Arc::new(reviews), Arc::new(tours));
        let result = service.create_review(new_review(3)).await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_refresh_without_reviews_uses_defaults() {
        let mut reviews = MockReviewRepository::new();
        let mut tours = MockTourRepository::new();

        reviews.expect_rating_summary().returning(|_| {
            Ok(RatingSummary {
                quantity: 0,
                average: None,
            })
        });
        tours
            .expect_update_rating_stats()
            .withf(|_, quantity, average| *quantity == 0 && *average == DEFAULT_RATING)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = ReviewService::new(Arc::new(reviews), Arc::new(tours));
        assert!(service.refresh_tour_rating(3).await.is_ok());
    }
}
