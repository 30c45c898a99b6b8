//! Review entity and its collection schema.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::query::{CollectionSchema, FieldDef, FieldKind};

/// A user's review of a tour. One review per (user, tour).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub review: String,
    pub rating: i32,
    #[serde(rename = "tour")]
    pub tour_id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "__v")]
    pub version: i32,
}

/// Input data for creating a review.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub review: String,
    pub rating: i32,
    pub tour_id: i64,
    pub user_id: i64,
}

/// Review count and mean rating for one tour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub quantity: i64,
    pub average: Option<f64>,
}

const REVIEW_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "id", FieldKind::Id),
    FieldDef::new("review", "review", FieldKind::Text),
    // Stored as an integer; compared as a number so `ratingMin=4.5` is a valid bound.
    FieldDef::new("rating", "rating", FieldKind::Number),
    FieldDef::new("tour", "tour_id", FieldKind::Id),
    FieldDef::new(
        "user",
        "(SELECT jsonb_build_object('id', u.id, 'name', u.name, 'avatar', u.avatar) \
         FROM users u WHERE u.id = reviews.user_id)",
        FieldKind::Composite,
    ),
    FieldDef::hidden("userId", "user_id", FieldKind::Id),
    FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    FieldDef::new("updatedAt", "updated_at", FieldKind::Timestamp),
    FieldDef::new("__v", "version", FieldKind::Integer),
];

/// Queryable shape of the `reviews` collection.
///
/// `user` is populated with the author's `id`, `name` and `avatar`.
pub const REVIEW_COLLECTION: CollectionSchema = CollectionSchema {
    name: "reviews",
    table: "reviews",
    fields: REVIEW_FIELDS,
};
