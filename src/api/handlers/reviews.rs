//! Handlers for review endpoints, flat and nested under a tour.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::response::{ListResponse, Success};
use crate::api::dto::review::{CreateReviewRequest, ReviewData};
use crate::api::middleware::CurrentUser;
use crate::domain::entities::NewReview;
use crate::domain::query::QueryRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Lists all reviews.
///
/// # Endpoint
///
/// `GET /api/v1/reviews`
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Query(request): Query<QueryRequest>,
) -> Result<Json<ListResponse>, AppError> {
    let page = state.review_service.list_reviews(request, None).await?;
    Ok(Json(ListResponse::new("reviews", page)))
}

/// Lists the reviews of one tour.
///
/// # Endpoint
///
/// `GET /api/v1/tours/{id}/reviews`
pub async fn list_tour_reviews_handler(
    Path(tour_id): Path<i64>,
    State(state): State<AppState>,
    Query(request): Query<QueryRequest>,
) -> Result<Json<ListResponse>, AppError> {
    let page = state
        .review_service
        .list_reviews(request, Some(tour_id))
        .await?;
    Ok(Json(ListResponse::new("reviews", page)))
}

/// Creates a review. Requires role `user`.
///
/// # Endpoint
///
/// `POST /api/v1/reviews`
///
/// The body must name the `tour`. The signed-in user is the author.
///
/// # Errors
///
/// Returns 400 on invalid fields or if the user already reviewed the tour.
/// Returns 404 if the tour does not exist.
pub async fn create_review_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Success<ReviewData>>), AppError> {
    create_review(&state, user.id, payload, None).await
}

/// Creates a review of the tour in the path. Requires role `user`.
///
/// # Endpoint
///
/// `POST /api/v1/tours/{id}/reviews`
pub async fn create_tour_review_handler(
    Path(tour_id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Success<ReviewData>>), AppError> {
    create_review(&state, user.id, payload, Some(tour_id)).await
}

async fn create_review(
    state: &AppState,
    current_user_id: i64,
    payload: CreateReviewRequest,
    path_tour_id: Option<i64>,
) -> Result<(StatusCode, Json<Success<ReviewData>>), AppError> {
    payload.validate()?;

    let tour_id = payload
        .tour
        .or(path_tour_id)
        .ok_or_else(|| AppError::bad_request("Review must belong to a tour", json!({})))?;

    let (Some(review), Some(rating)) = (payload.review, payload.rating) else {
        return Err(AppError::bad_request("Missing required review fields", json!({})));
    };

    let review = state
        .review_service
        .create_review(NewReview {
            review: review.trim().to_string(),
            rating,
            tour_id,
            user_id: current_user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Success::new(ReviewData { review }))))
}
