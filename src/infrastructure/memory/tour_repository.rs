//! In-memory tour repository.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::collection_query::MemoryCollectionQuery;
use super::store::{MemoryStore, read, to_document, write};
use crate::domain::entities::{
    MonthlyPlan, NewTour, STATS_MIN_RATING, TOUR_COLLECTION, Tour, TourPatch, TourStats,
    visible_tours,
};
use crate::domain::query::{CollectionQuery, Page, QueryRequest};
use crate::domain::repositories::TourRepository;
use crate::error::AppError;

pub struct MemoryTourRepository {
    store: Arc<MemoryStore>,
}

impl MemoryTourRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

fn name_taken(tours: &[Tour], name: &str, except: Option<i64>) -> bool {
    tours
        .iter()
        .any(|t| t.name == name && Some(t.id) != except)
}

#[async_trait]
impl TourRepository for MemoryTourRepository {
    async fn list(&self, request: QueryRequest) -> Result<Page, AppError> {
        let documents = read(&self.store.tours)?
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;

        let mut query = MemoryCollectionQuery::new(&TOUR_COLLECTION, documents);
        query.find(visible_tours());
        Page::fetch(query, request).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tour>, AppError> {
        Ok(read(&self.store.tours)?
            .iter()
            .find(|t| t.id == id && !t.secret_tour)
            .cloned())
    }

    async fn create(&self, new_tour: NewTour) -> Result<Tour, AppError> {
        let mut tours = write(&self.store.tours)?;

        if name_taken(&tours, &new_tour.name, None) {
            return Err(AppError::duplicate(json!({ "field": "name" })));
        }

        let now = Utc::now();
        let tour = Tour {
            id: self.store.next_id(),
            name: new_tour.name,
            slug: new_tour.slug,
            duration: new_tour.duration,
            difficulty: new_tour.difficulty,
            rating: new_tour.rating,
            ratings_average: new_tour.ratings_average,
            ratings_quantity: new_tour.ratings_quantity,
            max_group_size: new_tour.max_group_size,
            price: new_tour.price,
            price_discount: new_tour.price_discount,
            summary: new_tour.summary,
            description: new_tour.description,
            image_cover: new_tour.image_cover,
            images: new_tour.images,
            start_dates: new_tour.start_dates,
            secret_tour: new_tour.secret_tour,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        tours.push(tour.clone());
        Ok(tour)
    }

    async fn update(&self, id: i64, patch: TourPatch) -> Result<Tour, AppError> {
        let mut tours = write(&self.store.tours)?;

        if let Some(name) = &patch.name
            && name_taken(&tours, name, Some(id))
        {
            return Err(AppError::duplicate(json!({ "field": "name" })));
        }

        let tour = tours
            .iter_mut()
            .find(|t| t.id == id && !t.secret_tour)
            .ok_or_else(|| AppError::not_found("No tour found with that ID", json!({ "id": id })))?;

        if let Some(v) = patch.name {
            tour.name = v;
        }
        if let Some(v) = patch.slug {
            tour.slug = v;
        }
        if let Some(v) = patch.duration {
            tour.duration = v;
        }
        if let Some(v) = patch.difficulty {
            tour.difficulty = v;
        }
        if let Some(v) = patch.rating {
            tour.rating = v;
        }
        if let Some(v) = patch.ratings_average {
            tour.ratings_average = v;
        }
        if let Some(v) = patch.max_group_size {
            tour.max_group_size = v;
        }
        if let Some(v) = patch.price {
            tour.price = v;
        }
        if let Some(v) = patch.price_discount {
            tour.price_discount = v;
        }
        if let Some(v) = patch.summary {
            tour.summary = Some(v);
        }
        if let Some(v) = patch.description {
            tour.description = Some(v);
        }
        if let Some(v) = patch.image_cover {
            tour.image_cover = v;
        }
        if let Some(v) = patch.images {
            tour.images = v;
        }
        if let Some(v) = patch.start_dates {
            tour.start_dates = v;
        }
        if let Some(v) = patch.secret_tour {
            tour.secret_tour = v;
        }
        tour.updated_at = Utc::now();
        tour.version += 1;

        Ok(tour.clone())
    }

    /// Removes the tour together with its reviews.
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tours = write(&self.store.tours)?;
        let before = tours.len();
        tours.retain(|t| t.id != id || t.secret_tour);
        if tours.len() == before {
            return Ok(false);
        }

        write(&self.store.reviews)?.retain(|r| r.tour_id != id);
        Ok(true)
    }

    async fn stats(&self) -> Result<Vec<TourStats>, AppError> {
        let tours = read(&self.store.tours)?;

        let mut groups: BTreeMap<&'static str, Vec<&Tour>> = BTreeMap::new();
        for tour in tours
            .iter()
            .filter(|t| !t.secret_tour && t.ratings_average >= STATS_MIN_RATING)
        {
            groups.entry(tour.difficulty.as_str()).or_default().push(tour);
        }

        let mut stats: Vec<TourStats> = groups
            .into_iter()
            .map(|(difficulty, group)| {
                let count = group.len() as f64;
                TourStats {
                    difficulty: difficulty.to_string(),
                    num_tours: group.len() as i64,
                    num_ratings: group.iter().map(|t| i64::from(t.ratings_quantity)).sum(),
                    avg_rating: group.iter().map(|t| t.ratings_average).sum::<f64>() / count,
                    avg_price: group.iter().map(|t| t.price).sum::<f64>() / count,
                    min_price: group.iter().map(|t| t.price).fold(f64::INFINITY, f64::min),
                    max_price: group
                        .iter()
                        .map(|t| t.price)
                        .fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect();

        stats.sort_by(|a, b| a.avg_rating.total_cmp(&b.avg_rating));
        Ok(stats)
    }

    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlan>, AppError> {
        let tours = read(&self.store.tours)?;

        let mut months: BTreeMap<u32, i64> = BTreeMap::new();
        for date in tours
            .iter()
            .filter(|t| !t.secret_tour)
            .flat_map(|t| t.start_dates.iter())
            .filter(|d| d.year() == year)
        {
            *months.entry(date.month()).or_default() += 1;
        }

        Ok(months
            .into_iter()
            .map(|(month, num_tours)| MonthlyPlan {
                month,
                year,
                num_tours,
            })
            .collect())
    }

    async fn update_rating_stats(
        &self,
        id: i64,
        quantity: i32,
        average: f64,
    ) -> Result<(), AppError> {
        let mut tours = write(&self.store.tours)?;
        if let Some(tour) = tours.iter_mut().find(|t| t.id == id) {
            tour.ratings_quantity = quantity;
            tour.ratings_average = average;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        read(&self.store.tours).map(|_| ())
    }
}
