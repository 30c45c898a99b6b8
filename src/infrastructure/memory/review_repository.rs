//! In-memory review repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use super::collection_query::MemoryCollectionQuery;
use super::store::{MemoryStore, read, to_document, write};
use crate::domain::entities::{NewReview, REVIEW_COLLECTION, RatingSummary, Review, User};
use crate::domain::query::{CollectionQuery, Document, Filter, Page, QueryRequest};
use crate::domain::repositories::ReviewRepository;
use crate::error::AppError;

pub struct MemoryReviewRepository {
    store: Arc<MemoryStore>,
}

impl MemoryReviewRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

/// Replaces the `user` ID with the author's public summary.
fn review_document(review: &Review, users: &[User]) -> Result<Document, AppError> {
    let mut document = to_document(review)?;

    let author = users
        .iter()
        .find(|u| u.id == review.user_id)
        .map(|u| json!({ "id": u.id, "name": u.name, "avatar": u.avatar }))
        .unwrap_or(Value::Null);

    document.insert("user".to_string(), author);
    document.insert("userId".to_string(), json!(review.user_id));
    Ok(document)
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn list(&self, request: QueryRequest, tour_id: Option<i64>) -> Result<Page, AppError> {
        let documents = {
            let users = read(&self.store.users)?;
            read(&self.store.reviews)?
                .iter()
                .map(|r| review_document(r, &users))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut query = MemoryCollectionQuery::new(&REVIEW_COLLECTION, documents);
        if let Some(tour_id) = tour_id {
            query.find(Filter::new().eq("tour", tour_id.to_string()));
        }
        Page::fetch(query, request).await
    }

    async fn create(&self, new_review: NewReview) -> Result<Review, AppError> {
        let mut reviews = write(&self.store.reviews)?;

        if reviews
            .iter()
            .any(|r| r.user_id == new_review.user_id && r.tour_id == new_review.tour_id)
        {
            return Err(AppError::duplicate(json!({ "fields": ["user", "tour"] })));
        }

        let now = Utc::now();
        let review = Review {
            id: self.store.next_id(),
            review: new_review.review,
            rating: new_review.rating,
            tour_id: new_review.tour_id,
            user_id: new_review.user_id,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        reviews.push(review.clone());
        Ok(review)
    }

    async fn rating_summary(&self, tour_id: i64) -> Result<RatingSummary, AppError> {
        let reviews = read(&self.store.reviews)?;
        let ratings: Vec<f64> = reviews
            .iter()
            .filter(|r| r.tour_id == tour_id)
            .map(|r| f64::from(r.rating))
            .collect();

        let quantity = ratings.len() as i64;
        let average = (quantity > 0).then(|| ratings.iter().sum::<f64>() / quantity as f64);
        Ok(RatingSummary { quantity, average })
    }
}
