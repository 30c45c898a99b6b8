//! Translates a [`QueryRequest`] into constraints on a [`CollectionQuery`].
//!
//! Stages run in a fixed order (filter, sort, field exclusion, pagination):
//!
//! ```rust,ignore
//! let builder = QueryBuilder::new(repo.query(), request)
//!     .filter()
//!     .sort()
//!     .exclude_fields()
//!     .paginate();
//! let total = builder.count().await?;
//! let docs = builder.into_query().exec().await?;
//! ```

use super::collection::CollectionQuery;
use super::filter::{Filter, Projection, SortSpec};
use super::request::QueryRequest;
use crate::error::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Applied when the request carries no `sort`.
pub const DEFAULT_SORT: &str = "-createdAt";

/// Internal bookkeeping fields never returned in list responses.
pub const EXCLUDED_FIELDS: [&str; 3] = ["__v", "createdAt", "updatedAt"];

/// Field the `ratingMin` / `ratingMax` bounds apply to.
pub const RATING_FIELD: &str = "rating";

/// Resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Reads `page` and `limit`, falling back to defaults for missing,
    /// non-numeric or non-positive values. `limit` is capped at [`MAX_LIMIT`].
    pub fn from_request(request: &QueryRequest) -> Self {
        let positive = |key: &str| {
            request
                .get_int(key)
                .filter(|n| *n >= 1)
                .map(|n| n as u64)
        };

        Self {
            page: positive("page").unwrap_or(DEFAULT_PAGE),
            limit: positive("limit").unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Builds the equality/range filter from a request.
///
/// - `name`, `difficulty`: exact match
/// - `price=min,max`: inclusive bounds, either side optional
/// - `ratingMin` / `ratingMax`: merged into one inclusive range on `rating`
pub fn build_filter(request: &QueryRequest) -> Filter {
    let mut filter = Filter::new();

    if let Some(name) = request.get("name") {
        filter = filter.eq("name", name);
    }

    if let Some(price) = request.get("price") {
        let mut bounds = price.split(',');
        let min = non_empty(bounds.next());
        let max = non_empty(bounds.next());
        filter = filter.range("price", min, max);
    }

    filter = filter.range(
        RATING_FIELD,
        request.get("ratingMin").map(str::to_string),
        request.get("ratingMax").map(str::to_string),
    );

    if let Some(difficulty) = request.get("difficulty") {
        filter = filter.eq("difficulty", difficulty);
    }

    filter
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Created,
    Filtered,
    Sorted,
    Projected,
    Paginated,
}

/// Request-scoped builder owning the query it shapes.
pub struct QueryBuilder<Q: CollectionQuery> {
    query: Q,
    request: QueryRequest,
    stage: Stage,
    pagination: Pagination,
}

impl<Q: CollectionQuery> QueryBuilder<Q> {
    pub fn new(query: Q, request: QueryRequest) -> Self {
        let pagination = Pagination::from_request(&request);
        Self {
            query,
            request,
            stage: Stage::Created,
            pagination,
        }
    }

    /// Runs every stage in order.
    pub fn apply(query: Q, request: QueryRequest) -> Self {
        Self::new(query, request)
            .filter()
            .sort()
            .exclude_fields()
            .paginate()
    }

    pub fn filter(mut self) -> Self {
        self.enter(Stage::Filtered);
        let filter = build_filter(&self.request);
        self.query.find(filter);
        self
    }

    pub fn sort(mut self) -> Self {
        self.enter(Stage::Sorted);
        let spec = self.request.get("sort").unwrap_or(DEFAULT_SORT);
        self.query.sort(SortSpec::parse(spec));
        self
    }

    pub fn exclude_fields(mut self) -> Self {
        self.enter(Stage::Projected);
        self.query.select(Projection::exclude(EXCLUDED_FIELDS));
        self
    }

    /// Applies skip/limit. Pages past the end yield an empty result.
    pub fn paginate(mut self) -> Self {
        self.enter(Stage::Paginated);
        self.query
            .skip_limit(self.pagination.skip(), self.pagination.limit);
        self
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Counts all documents matching the filter (ignores the page window).
    ///
    /// # Errors
    ///
    /// Propagates errors from [`CollectionQuery::count_documents`].
    pub async fn count(&self) -> Result<u64, AppError> {
        self.query.count_documents().await
    }

    pub fn into_query(self) -> Q {
        self.query
    }

    fn enter(&mut self, stage: Stage) {
        debug_assert!(
            stage > self.stage,
            "query stages must run as filter, sort, exclude_fields, paginate"
        );
        self.stage = stage;
    }
}
