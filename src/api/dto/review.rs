//! DTOs for review endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Review;

/// Request body for `POST /api/v1/reviews` and `POST /api/v1/tours/{id}/reviews`.
///
/// `tour` falls back to the path. The author is always the signed-in user;
/// a `user` field in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(
        required(message = "Review can not be empty"),
        length(min = 1, message = "Review can not be empty")
    )]
    pub review: Option<String>,

    #[validate(
        required(message = "A review must have a rating"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<i32>,

    pub tour: Option<i64>,
}

/// `{ "review": ... }`
#[derive(Debug, Serialize)]
pub struct ReviewData {
    pub review: Review,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_bounds() {
        let req: CreateReviewRequest =
            serde_json::from_value(json!({ "review": "Great", "rating": 6 })).unwrap();
        assert!(req.validate().is_err());

        let req: CreateReviewRequest =
            serde_json::from_value(json!({ "review": "Great", "rating": 5, "tour": 3 })).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.tour, Some(3));
    }

    #[test]
    fn test_missing_review_text() {
        let req: CreateReviewRequest = serde_json::from_value(json!({ "rating": 4 })).unwrap();
        assert!(req.validate().is_err());
    }
}
