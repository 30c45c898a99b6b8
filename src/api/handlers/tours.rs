//! Handlers for tour endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::response::{ListResponse, Success};
use crate::api::dto::tour::{CreateTourRequest, TourData, UpdateTourRequest};
use crate::domain::entities::{MonthlyPlan, TourStats};
use crate::domain::query::QueryRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Lists tours.
///
/// # Endpoint
///
/// `GET /api/v1/tours`
///
/// # Query Parameters
///
/// - `name`, `difficulty` - exact match
/// - `price=min,max` - inclusive price range, either bound optional
/// - `ratingMin`, `ratingMax` - inclusive rating bounds
/// - `sort` - comma-separated fields, `-` prefix for descending (default `-createdAt`)
/// - `page`, `limit` - pagination (defaults 1 and 10)
///
/// # Errors
///
/// Returns 400 for malformed filter values or unknown sort fields.
pub async fn list_tours_handler(
    State(state): State<AppState>,
    Query(request): Query<QueryRequest>,
) -> Result<Json<ListResponse>, AppError> {
    let page = state.tour_service.list_tours(request).await?;
    Ok(Json(ListResponse::new("tours", page)))
}

/// Lists the five best rated tours, cheapest first among equals.
///
/// # Endpoint
///
/// `GET /api/v1/tours/top-5-cheap`
///
/// Accepts the same parameters as [`list_tours_handler`]; `limit` and `sort`
/// are overridden.
pub async fn top_cheap_tours_handler(
    State(state): State<AppState>,
    Query(request): Query<QueryRequest>,
) -> Result<Json<ListResponse>, AppError> {
    let page = state.tour_service.list_top_cheap(request).await?;
    Ok(Json(ListResponse::new("tours", page)))
}

/// # Endpoint
///
/// `GET /api/v1/tours/{id}`
///
/// # Errors
///
/// Returns 404 if the tour does not exist.
pub async fn get_tour_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Success<TourData>>, AppError> {
    let tour = state.tour_service.get_tour(id).await?;
    Ok(Json(Success::new(TourData { tour: tour.into() })))
}

/// Creates a tour. Requires role `admin` or `lead-guide`.
///
/// # Endpoint
///
/// `POST /api/v1/tours`
///
/// # Errors
///
/// Returns 400 on missing or invalid fields, a discount not below the price,
/// or a duplicate name.
pub async fn create_tour_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateTourRequest>,
) -> Result<(StatusCode, Json<Success<TourData>>), AppError> {
    payload.validate()?;

    let new_tour = payload
        .into_new_tour()
        .ok_or_else(|| AppError::bad_request("Missing required tour fields", json!({})))?;

    let tour = state.tour_service.create_tour(new_tour).await?;

    Ok((
        StatusCode::CREATED,
        Json(Success::new(TourData { tour: tour.into() })),
    ))
}

/// Partially updates a tour. Requires role `admin` or `lead-guide`.
///
/// # Endpoint
///
/// `PATCH /api/v1/tours/{id}`
///
/// `priceDiscount: null` removes the discount. A new name re-derives the slug.
///
/// # Errors
///
/// Returns 400 on invalid fields or a discount not below the price.
/// Returns 404 if the tour does not exist.
pub async fn update_tour_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTourRequest>,
) -> Result<Json<Success<TourData>>, AppError> {
    payload.validate()?;

    let tour = state.tour_service.update_tour(id, payload.into()).await?;

    Ok(Json(Success::new(TourData { tour: tour.into() })))
}

/// Deletes a tour. Requires role `admin` or `lead-guide`.
///
/// # Endpoint
///
/// `DELETE /api/v1/tours/{id}`
///
/// # Errors
///
/// Returns 404 if the tour does not exist.
pub async fn delete_tour_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.tour_service.delete_tour(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Per-difficulty statistics over tours rated 4.5 or better.
///
/// # Endpoint
///
/// `GET /api/v1/tours/stats`
pub async fn tour_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<Success<Vec<TourStats>>>, AppError> {
    let stats = state.tour_service.stats().await?;
    Ok(Json(Success::new(stats)))
}

/// Number of tour starts per month of `year`.
///
/// # Endpoint
///
/// `GET /api/v1/tours/monthly-plan/{year}`
pub async fn monthly_plan_handler(
    Path(year): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<Success<Vec<MonthlyPlan>>>, AppError> {
    let plan = state.tour_service.monthly_plan(year).await?;
    Ok(Json(Success::new(plan)))
}
