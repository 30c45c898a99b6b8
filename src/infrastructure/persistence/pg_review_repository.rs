//! PostgreSQL implementation of the review repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use super::pg_collection_query::PgCollectionQuery;
use crate::domain::entities::{NewReview, REVIEW_COLLECTION, RatingSummary, Review};
use crate::domain::query::{CollectionQuery, Filter, Page, QueryRequest};
use crate::domain::repositories::ReviewRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct ReviewRow {
    id: i64,
    review: String,
    rating: i32,
    tour_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            review: row.review,
            rating: row.rating,
            tour_id: row.tour_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        }
    }
}

pub struct PgReviewRepository {
    pool: Arc<PgPool>,
}

impl PgReviewRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn list(&self, request: QueryRequest, tour_id: Option<i64>) -> Result<Page, AppError> {
        let mut query = PgCollectionQuery::new(self.pool.clone(), &REVIEW_COLLECTION);
        if let Some(tour_id) = tour_id {
            query.find(Filter::new().eq("tour", tour_id.to_string()));
        }
        Page::fetch(query, request).await
    }

    async fn create(&self, new_review: NewReview) -> Result<Review, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (review, rating, tour_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, review, rating, tour_id, user_id, created_at, updated_at, version
            "#,
        )
        .bind(new_review.review)
        .bind(new_review.rating)
        .bind(new_review.tour_id)
        .bind(new_review.user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn rating_summary(&self, tour_id: i64) -> Result<RatingSummary, AppError> {
        let (quantity, average): (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating)::float8 FROM reviews WHERE tour_id = $1",
        )
        .bind(tour_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(RatingSummary { quantity, average })
    }
}
