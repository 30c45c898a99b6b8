//! PostgreSQL implementation of the tour repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use super::pg_collection_query::PgCollectionQuery;
use crate::domain::entities::{
    Difficulty, MonthlyPlan, NewTour, STATS_MIN_RATING, TOUR_COLLECTION, Tour, TourPatch,
    TourStats, visible_tours,
};
use crate::domain::query::{CollectionQuery, Page, QueryRequest};
use crate::domain::repositories::TourRepository;
use crate::error::AppError;

const TOUR_COLUMNS: &str = "id, name, slug, duration, difficulty, rating, ratings_average, \
    ratings_quantity, max_group_size, price, price_discount, summary, description, image_cover, \
    images, start_dates, secret_tour, created_at, updated_at, version";

#[derive(FromRow)]
struct TourRow {
    id: i64,
    name: String,
    slug: String,
    duration: i32,
    difficulty: String,
    rating: f64,
    ratings_average: f64,
    ratings_quantity: i32,
    max_group_size: i32,
    price: f64,
    price_discount: Option<f64>,
    summary: Option<String>,
    description: Option<String>,
    image_cover: String,
    images: Vec<String>,
    start_dates: Vec<DateTime<Utc>>,
    secret_tour: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl TryFrom<TourRow> for Tour {
    type Error = AppError;

    fn try_from(row: TourRow) -> Result<Self, Self::Error> {
        let difficulty = row.difficulty.parse::<Difficulty>().map_err(|reason| {
            AppError::internal("Corrupt tour row", json!({ "id": row.id, "reason": reason }))
        })?;

        Ok(Tour {
            id: row.id,
            name: row.name,
            slug: row.slug,
            duration: row.duration,
            difficulty,
            rating: row.rating,
            ratings_average: row.ratings_average,
            ratings_quantity: row.ratings_quantity,
            max_group_size: row.max_group_size,
            price: row.price,
            price_discount: row.price_discount,
            summary: row.summary,
            description: row.description,
            image_cover: row.image_cover,
            images: row.images,
            start_dates: row.start_dates,
            secret_tour: row.secret_tour,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

#[derive(FromRow)]
struct TourStatsRow {
    difficulty: String,
    num_tours: i64,
    num_ratings: i64,
    avg_rating: f64,
    avg_price: f64,
    min_price: f64,
    max_price: f64,
}

/// PostgreSQL repository for tours.
///
/// Every read and write skips secret tours, except rating maintenance.
pub struct PgTourRepository {
    pool: Arc<PgPool>,
}

impl PgTourRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Renders the `UPDATE` for a patch; `version` is bumped on every update.
fn update_query(id: i64, patch: TourPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE tours SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(v) = patch.name {
            set.push("name = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.slug {
            set.push("slug = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.duration {
            set.push("duration = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.difficulty {
            set.push("difficulty = ")
                .push_bind_unseparated(v.as_str().to_string());
        }
        if let Some(v) = patch.rating {
            set.push("rating = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.ratings_average {
            set.push("ratings_average = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.max_group_size {
            set.push("max_group_size = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.price {
            set.push("price = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.price_discount {
            set.push("price_discount = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.summary {
            set.push("summary = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.description {
            set.push("description = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.image_cover {
            set.push("image_cover = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.images {
            set.push("images = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.start_dates {
            set.push("start_dates = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.secret_tour {
            set.push("secret_tour = ").push_bind_unseparated(v);
        }
        set.push("updated_at = now()");
        set.push("version = version + 1");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" AND NOT secret_tour RETURNING ");
    qb.push(TOUR_COLUMNS);
    qb
}

#[async_trait]
impl TourRepository for PgTourRepository {
    async fn list(&self, request: QueryRequest) -> Result<Page, AppError> {
        let mut query = PgCollectionQuery::new(self.pool.clone(), &TOUR_COLLECTION);
        query.find(visible_tours());
        Page::fetch(query, request).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tour>, AppError> {
        let row = sqlx::query_as::<_, TourRow>(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1 AND NOT secret_tour"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Tour::try_from).transpose()
    }

    async fn create(&self, new_tour: NewTour) -> Result<Tour, AppError> {
        let row = sqlx::query_as::<_, TourRow>(&format!(
            r#"
            INSERT INTO tours (name, slug, duration, difficulty, rating, ratings_average,
                ratings_quantity, max_group_size, price, price_discount, summary, description,
                image_cover, images, start_dates, secret_tour)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {TOUR_COLUMNS}
            "#
        ))
        .bind(new_tour.name)
        .bind(new_tour.slug)
        .bind(new_tour.duration)
        .bind(new_tour.difficulty.as_str())
        .bind(new_tour.rating)
        .bind(new_tour.ratings_average)
        .bind(new_tour.ratings_quantity)
        .bind(new_tour.max_group_size)
        .bind(new_tour.price)
        .bind(new_tour.price_discount)
        .bind(new_tour.summary)
        .bind(new_tour.description)
        .bind(new_tour.image_cover)
        .bind(new_tour.images)
        .bind(new_tour.start_dates)
        .bind(new_tour.secret_tour)
        .fetch_one(self.pool.as_ref())
        .await?;

        Tour::try_from(row)
    }

    async fn update(&self, id: i64, patch: TourPatch) -> Result<Tour, AppError> {
        let row = update_query(id, patch)
            .build_query_as::<TourRow>()
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::not_found("No tour found with that ID", json!({ "id": id })))?;

        Tour::try_from(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1 AND NOT secret_tour")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<Vec<TourStats>, AppError> {
        let rows = sqlx::query_as::<_, TourStatsRow>(
            r#"
            SELECT
                difficulty,
                COUNT(*) AS num_tours,
                COALESCE(SUM(ratings_quantity), 0)::bigint AS num_ratings,
                AVG(ratings_average) AS avg_rating,
                AVG(price) AS avg_price,
                MIN(price) AS min_price,
                MAX(price) AS max_price
            FROM tours
            WHERE ratings_average >= $1 AND NOT secret_tour
            GROUP BY difficulty
            ORDER BY avg_rating ASC
            "#,
        )
        .bind(STATS_MIN_RATING)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TourStats {
                difficulty: r.difficulty,
                num_tours: r.num_tours,
                num_ratings: r.num_ratings,
                avg_rating: r.avg_rating,
                avg_price: r.avg_price,
                min_price: r.min_price,
                max_price: r.max_price,
            })
            .collect())
    }

    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlan>, AppError> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT
                EXTRACT(MONTH FROM start_date AT TIME ZONE 'UTC')::int AS month,
                COUNT(*) AS num_tours
            FROM tours, unnest(start_dates) AS start_date
            WHERE NOT secret_tour
              AND EXTRACT(YEAR FROM start_date AT TIME ZONE 'UTC')::int = $1
            GROUP BY month
            ORDER BY month ASC
            "#,
        )
        .bind(year)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(month, num_tours)| MonthlyPlan {
                month: month.unsigned_abs(),
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
        sqlx::query("UPDATE tours SET ratings_quantity = $2, ratings_average = $3 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .bind(average)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}
