//! Tour entity and its collection schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use std::str::FromStr;

use crate::domain::query::{CollectionSchema, FieldDef, FieldKind, Filter};

/// Tour difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "difficult" => Ok(Difficulty::Difficult),
            other => Err(format!(
                "Difficulty is either: easy, medium, difficult (got '{}')",
                other
            )),
        }
    }
}

/// Default rating for tours without reviews.
pub const DEFAULT_RATING: f64 = 4.5;

/// A bookable tour.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub difficulty: Difficulty,
    pub rating: f64,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub max_group_size: i32,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    pub secret_tour: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "__v")]
    pub version: i32,
}

impl Tour {
    /// Tour length in weeks.
    pub fn duration_weeks(&self) -> f64 {
        f64::from(self.duration) / 7.0
    }
}

/// Input data for creating a tour. The slug is derived by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTour {
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub difficulty: Difficulty,
    pub rating: f64,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub max_group_size: i32,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    pub secret_tour: bool,
}

/// Partial update for an existing tour.
///
/// `None` fields are left unchanged. `price_discount: Some(None)` clears the discount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub duration: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub rating: Option<f64>,
    pub ratings_average: Option<f64>,
    pub max_group_size: Option<i32>,
    pub price: Option<f64>,
    pub price_discount: Option<Option<f64>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

/// Per-difficulty aggregate over well-rated tours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStats {
    pub difficulty: String,
    pub num_tours: i64,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Number of tour starts within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlan {
    pub month: u32,
    pub year: i32,
    pub num_tours: i64,
}

/// Minimum `ratingsAverage` for a tour to be included in [`TourStats`].
pub const STATS_MIN_RATING: f64 = 4.5;

const TOUR_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "id", FieldKind::Id),
    FieldDef::new("name", "name", FieldKind::Text),
    FieldDef::new("slug", "slug", FieldKind::Text),
    FieldDef::new("duration", "duration", FieldKind::Integer),
    FieldDef::new("difficulty", "difficulty", FieldKind::Text),
    FieldDef::new("rating", "rating", FieldKind::Number),
    FieldDef::new("ratingsAverage", "ratings_average", FieldKind::Number),
    FieldDef::new("ratingsQuantity", "ratings_quantity", FieldKind::Integer),
    FieldDef::new("maxGroupSize", "max_group_size", FieldKind::Integer),
    FieldDef::new("price", "price", FieldKind::Number),
    FieldDef::new("priceDiscount", "price_discount", FieldKind::Number),
    FieldDef::new("summary", "summary", FieldKind::Text),
    FieldDef::new("description", "description", FieldKind::Text),
    FieldDef::new("imageCover", "image_cover", FieldKind::Text),
    FieldDef::new("images", "images", FieldKind::Composite),
    FieldDef::new("startDates", "start_dates", FieldKind::Composite),
    FieldDef::new("secretTour", "secret_tour", FieldKind::Bool),
    FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    FieldDef::new("updatedAt", "updated_at", FieldKind::Timestamp),
    FieldDef::new("__v", "version", FieldKind::Integer),
];

/// Queryable shape of the `tours` collection.
pub const TOUR_COLLECTION: CollectionSchema = CollectionSchema {
    name: "tours",
    table: "tours",
    fields: TOUR_FIELDS,
};

/// Base condition of every tour query: secret tours are never returned.
pub fn visible_tours() -> Filter {
    Filter::new().ne("secretTour", "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tour() -> Tour {
        let now = Utc::now();
        Tour {
            id: 1,
            name: "The Forest Hiker".to_string(),
            slug: "the-forest-hiker".to_string(),
            duration: 5,
            difficulty: Difficulty::Easy,
            rating: 4.7,
            ratings_average: 4.7,
            ratings_quantity: 37,
            max_group_size: 25,
            price: 397.0,
            price_discount: None,
            summary: Some("Breathtaking hike through the Canadian Banff National Park".to_string()),
            description: None,
            image_cover: "tour-1-cover.jpg".to_string(),
            images: vec!["tour-1-1.jpg".to_string()],
            start_dates: vec![now],
            secret_tour: false,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[test]
    fn test_difficulty_round_trip() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Difficult] {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_duration_weeks() {
        let mut tour = sample_tour();
        tour.duration = 14;
        assert_eq!(tour.duration_weeks(), 2.0);
    }

    #[test]
    fn test_serialization_uses_schema_names() {
        let value = serde_json::to_value(sample_tour()).unwrap();
        let object = value.as_object().unwrap();

        for key in object.keys() {
            assert!(
                TOUR_COLLECTION.field(key).is_some(),
                "serialized key {} missing from schema",
                key
            );
        }
        assert!(object.contains_key("__v"));
        assert!(object.contains_key("ratingsAverage"));
        assert!(!object.contains_key("priceDiscount"));
    }
}
