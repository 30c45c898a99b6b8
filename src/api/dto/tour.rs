//! DTOs for tour endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::domain::entities::{DEFAULT_RATING, Difficulty, NewTour, Tour, TourPatch};

/// Request body for `POST /api/v1/tours`.
///
/// Required fields are optional here so a missing field is reported with its
/// own message instead of a generic deserialization error.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourRequest {
    #[validate(
        required(message = "A tour must have a name"),
        length(min = 1, max = 40, message = "A tour name must have between 1 and 40 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "A tour must have a duration"),
        range(min = 1, message = "Duration must be at least one day")
    )]
    pub duration: Option<i32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(required(message = "A tour must have a difficulty"))]
    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub ratings_average: Option<f64>,

    #[validate(range(min = 0, message = "Ratings quantity cannot be negative"))]
    pub ratings_quantity: Option<i32>,

    #[validate(
        required(message = "A tour must have a group size"),
        range(min = 1, message = "Group size must be at least 1")
    )]
    pub max_group_size: Option<i32>,

    #[validate(
        required(message = "A tour must have a price"),
        range(min = 0.0, message = "Price cannot be negative")
    )]
    pub price: Option<f64>,

    pub price_discount: Option<f64>,

    pub summary: Option<String>,

    pub description: Option<String>,

    #[validate(required(message = "A tour must have a cover image"))]
    pub image_cover: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,

    #[serde(default)]
    pub secret_tour: bool,
}

impl CreateTourRequest {
    /// Converts a validated request. Returns `None` if a required field is missing.
    pub fn into_new_tour(self) -> Option<NewTour> {
        Some(NewTour {
            name: self.name?.trim().to_string(),
            slug: String::new(),
            duration: self.duration?,
            difficulty: self.difficulty?,
            rating: self.rating.unwrap_or(DEFAULT_RATING),
            ratings_average: self.ratings_average.unwrap_or(DEFAULT_RATING),
            ratings_quantity: self.ratings_quantity.unwrap_or(0),
            max_group_size: self.max_group_size?,
            price: self.price?,
            price_discount: self.price_discount,
            summary: trimmed(self.summary),
            description: trimmed(self.description),
            image_cover: self.image_cover?,
            images: self.images,
            start_dates: self.start_dates,
            secret_tour: self.secret_tour,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Request body for `PATCH /api/v1/tours/{id}`. Absent fields are left unchanged;
/// `"priceDiscount": null` removes the discount.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTourRequest {
    #[validate(length(min = 1, max = 40, message = "A tour name must have between 1 and 40 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "Duration must be at least one day"))]
    pub duration: Option<i32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub ratings_average: Option<f64>,

    #[validate(range(min = 1, message = "Group size must be at least 1"))]
    pub max_group_size: Option<i32>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,

    #[serde(default, with = "serde_with::rust::double_option")]
    pub price_discount: Option<Option<f64>>,

    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

impl From<UpdateTourRequest> for TourPatch {
    fn from(req: UpdateTourRequest) -> Self {
        TourPatch {
            name: trimmed(req.name),
            slug: None,
            duration: req.duration,
            difficulty: req.difficulty,
            rating: req.rating,
            ratings_average: req.ratings_average,
            max_group_size: req.max_group_size,
            price: req.price,
            price_discount: req.price_discount,
            summary: trimmed(req.summary),
            description: trimmed(req.description),
            image_cover: req.image_cover,
            images: req.images,
            start_dates: req.start_dates,
            secret_tour: req.secret_tour,
        }
    }
}

/// A single tour with its `durationWeeks` virtual.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourBody {
    #[serde(flatten)]
    pub tour: Tour,
    pub duration_weeks: f64,
}

impl From<Tour> for TourBody {
    fn from(tour: Tour) -> Self {
        let duration_weeks = tour.duration_weeks();
        Self {
            tour,
            duration_weeks,
        }
    }
}

/// `{ "tour": ... }`
#[derive(Debug, Serialize)]
pub struct TourData {
    pub tour: TourBody,
}
