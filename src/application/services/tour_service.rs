//! Tour catalogue service.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::domain::entities::{MonthlyPlan, NewTour, Tour, TourPatch, TourStats};
use crate::domain::query::{Document, Page, QueryRequest};
use crate::domain::repositories::TourRepository;
use crate::error::AppError;
use crate::utils::slug::slugify;

/// Page size forced by the "top 5 cheap" alias.
pub const TOP_CHEAP_LIMIT: &str = "5";

/// Sort order forced by the "top 5 cheap" alias.
pub const TOP_CHEAP_SORT: &str = "-ratingsAverage,price";

/// Service for listing, maintaining and aggregating tours.
///
/// Derives slugs from names, enforces `priceDiscount < price` and adds the
/// `durationWeeks` virtual to returned documents.
pub struct TourService<R: TourRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: TourRepository + ?Sized> TourService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists tours shaped by the query string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed filter values or unknown fields.
    pub async fn list_tours(&self, request: QueryRequest) -> Result<Page, AppError> {
        let mut page = self.repository.list(request).await?;
        page.documents.iter_mut().for_each(add_duration_weeks);
        Ok(page)
    }

    /// Lists the five best rated tours, cheapest first among equals.
    ///
    /// Overrides `limit` and `sort`; every other parameter still applies.
    pub async fn list_top_cheap(&self, request: QueryRequest) -> Result<Page, AppError> {
        let request = request
            .with("limit", TOP_CHEAP_LIMIT)
            .with("sort", TOP_CHEAP_SORT);
        self.list_tours(request).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no visible tour has this ID.
    pub async fn get_tour(&self, id: i64) -> Result<Tour, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| tour_not_found(id))
    }

    /// Creates a tour, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the discount is not below the price
    /// or the name is already taken.
    pub async fn create_tour(&self, mut new_tour: NewTour) -> Result<Tour, AppError> {
        if let Some(discount) = new_tour.price_discount {
            check_discount(discount, new_tour.price)?;
        }

        new_tour.slug = slugify(&new_tour.name);

        let tour = self.repository.create(new_tour).await?;
        tracing::info!(tour_id = tour.id, slug = %tour.slug, "Tour created");
        Ok(tour)
    }

    /// Applies a partial update. A new name re-derives the slug.
    ///
    /// Whenever the price or the discount changes, the resulting pair is
    /// checked, filling in the stored value for the side left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tour does not exist.
    /// Returns [`AppError::Validation`] on an invalid discount or duplicate name.
    pub async fn update_tour(&self, id: i64, mut patch: TourPatch) -> Result<Tour, AppError> {
        if patch.price.is_some() || matches!(patch.price_discount, Some(Some(_))) {
            let stored = match (patch.price, patch.price_discount) {
                (Some(_), Some(_)) => None,
                _ => Some(self.get_tour(id).await?),
            };

            let price = patch.price.or(stored.as_ref().map(|t| t.price));
            let discount = match patch.price_discount {
                Some(discount) => discount,
                None => stored.as_ref().and_then(|t| t.price_discount),
            };

            if let (Some(price), Some(discount)) = (price, discount) {
                check_discount(discount, price)?;
            }
        }

        if let Some(name) = &patch.name {
            patch.slug = Some(slugify(name));
        }

        self.repository.update(id, patch).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tour does not exist.
    pub async fn delete_tour(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(tour_not_found(id));
        }

        tracing::info!(tour_id = id, "Tour deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<Vec<TourStats>, AppError> {
        self.repository.stats().await
    }

    pub async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlan>, AppError> {
        self.repository.monthly_plan(year).await
    }

    /// Checks storage connectivity for the health endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}

fn tour_not_found(id: i64) -> AppError {
    AppError::not_found("No tour found with that ID", json!({ "id": id }))
}

fn check_discount(discount: f64, price: f64) -> Result<(), AppError> {
    if discount >= price {
        return Err(AppError::bad_request(
            format!(
                "Price discount ({}) should be lower than the regular price",
                discount
            ),
            json!({ "priceDiscount": discount, "price": price }),
        ));
    }
    Ok(())
}

/// Adds `durationWeeks` to documents that carry a numeric `duration`.
fn add_duration_weeks(document: &mut Document) {
    if let Some(days) = document.get("duration").and_then(Value::as_f64) {
        document.insert("durationWeeks".to_string(), json!(days / 7.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Difficulty;
    use crate::domain::query::Pagination;
    use crate::domain::repositories::MockTourRepository;
    use chrono::Utc;

    fn create_test_tour(id: i64, name: &str, price: f64) -> Tour {
        let now = Utc::now();
        Tour {
            id,
            name: name.to_string(),
            slug: slugify(name),
            duration: 7,
            difficulty: Difficulty::Medium,
            rating: 4.5,
            ratings_average: 4.5,
            ratings_quantity: 0,
            max_group_size: 10,
            price,
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

    fn new_tour(name: &str, price: f64, discount: Option<f64>) -> NewTour {
        NewTour {
            name: name.to_string(),
            slug: String::new(),
            duration: 7,
            difficulty: Difficulty::Medium,
            rating: 4.5,
            ratings_average: 4.5,
            ratings_quantity: 0,
            max_group_size: 10,
            price,
            price_discount: discount,
            summary: None,
            description: None,
            image_cover: "cover.jpg".to_string(),
            images: Vec::new(),
            start_dates: Vec::new(),
            secret_tour: false,
        }
    }

    fn empty_page() -> Page {
        Page {
            documents: Vec::new(),
            total: 0,
            pagination: Pagination { page: 1, limit: 10 },
        }
    }

    #[tokio::test]
    async fn test_create_tour_derives_slug() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo
            .expect_create()
            .withf(|t| t.slug == "the-sea-explorer")
            .times(1)
            .returning(|t| Ok(create_test_tour(1, &t.name, t.price)));

        let service = TourService::new(Arc::new(mock_repo));
        let tour = service
            .create_tour(new_tour("The Sea Explorer", 497.0, None))
            .await
            .unwrap();

        assert_eq!(tour.slug, "the-sea-explorer");
    }

    #[tokio::test]
    async fn test_create_tour_rejects_discount_above_price() {
        let mut mock_repo = MockTourRepository::new();
        mock_repo.expect_create().times(0);

        let service = TourService::new(Arc::new(mock_repo));
        let result = service
            .create_tour(new_tour("The Sea Explorer", 100.0, Some(150.0)))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_discount_checked_against_stored_price() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(create_test_tour(id, "The Park Camper", 200.0))));
        mock_repo.expect_update().times(0);

        let service = TourService::new(Arc::new(mock_repo));
        let patch = TourPatch {
            price_discount: Some(Some(250.0)),
            ..Default::default()
        };

        let result = service.update_tour(3, patch).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_price_below_stored_discount_is_rejected() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo.expect_find_by_id().times(1).returning(|id| {
            let mut tour = create_test_tour(id, "The Northern Lights", 500.0);
            tour.price_discount = Some(400.0);
            Ok(Some(tour))
        });
        mock_repo.expect_update().times(0);

        let service = TourService::new(Arc::new(mock_repo));
        let patch = TourPatch {
            price: Some(100.0),
            ..Default::default()
        };

        let result = service.update_tour(3, patch).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_price_and_cleared_discount_skips_lookup() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo.expect_find_by_id().times(0);
        mock_repo
            .expect_update()
            .times(1)
            .returning(|id, _| Ok(create_test_tour(id, "The Northern Lights", 100.0)));

        let service = TourService::new(Arc::new(mock_repo));
        let patch = TourPatch {
            price: Some(100.0),
            price_discount: Some(None),
            ..Default::default()
        };

        assert!(service.update_tour(3, patch).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_name_rederives_slug() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo
            .expect_update()
            .withf(|id, patch| *id == 3 && patch.slug.as_deref() == Some("the-city-wanderer"))
            .times(1)
            .returning(|id, _| Ok(create_test_tour(id, "The City Wanderer", 100.0)));

        let service = TourService::new(Arc::new(mock_repo));
        let patch = TourPatch {
            name: Some("The City Wanderer".to_string()),
            ..Default::default()
        };

        assert!(service.update_tour(3, patch).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_tour_not_found() {
        let mut mock_repo = MockTourRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));

        let service = TourService::new(Arc::new(mock_repo));
        let result = service.get_tour(99).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_tour_is_not_found() {
        let mut mock_repo = MockTourRepository::new();
        mock_repo.expect_delete().times(1).returning(|_| Ok(false));

        let service = TourService::new(Arc::new(mock_repo));
        assert!(matches!(
            service.delete_tour(5).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_top_cheap_forces_limit_and_sort() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo
            .expect_list()
            .withf(|request| {
                request.get("limit") == Some("5")
                    && request.get("sort") == Some("-ratingsAverage,price")
                    && request.get("difficulty") == Some("easy")
            })
            .times(1)
            .returning(|_| Ok(empty_page()));

        let service = TourService::new(Arc::new(mock_repo));
        let request = QueryRequest::default()
            .with("limit", "50")
            .with("difficulty", "easy");

        assert!(service.list_top_cheap(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_adds_duration_weeks() {
        let mut mock_repo = MockTourRepository::new();

        mock_repo.expect_list().returning(|_| {
            let mut page = empty_page();
            let with_duration = json!({ "name": "A", "duration": 14 });
            let without_duration = json!({ "name": "B" });
            for doc in [with_duration, without_duration] {
                if let Value::Object(map) = doc {
                    page.documents.push(map);
                }
            }
            page.total = 2;
            Ok(page)
        });

        let service = TourService::new(Arc::new(mock_repo));
        let page = service.list_tours(QueryRequest::default()).await.unwrap();

        assert_eq!(page.documents[0]["durationWeeks"], json!(2.0));
        assert!(!page.documents[1].contains_key("durationWeeks"));
    }
}
