//! Capability trait implemented by persistence backends.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::filter::{Filter, Projection, SortSpec};
use crate::error::AppError;

/// A returned document: public field names to JSON values.
pub type Document = Map<String, Value>;

/// A not-yet-executed query against a collection.
///
/// Constraints are attached progressively and only take effect when the query
/// is executed, so the order of attachment does not change the result.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCollectionQuery`] - PostgreSQL
/// - [`crate::infrastructure::memory::MemoryCollectionQuery`] - in-memory snapshot
#[async_trait]
pub trait CollectionQuery: Send + Sync {
    /// Adds filter conditions (conjunction with the ones already attached).
    fn find(&mut self, filter: Filter);

    /// Replaces the sort order.
    fn sort(&mut self, sort: SortSpec);

    /// Replaces the projection.
    fn select(&mut self, projection: Projection);

    /// Sets the number of matching documents to skip and the maximum to return.
    fn skip_limit(&mut self, skip: u64, limit: u64);

    /// Counts documents matching the filter, ignoring sort, projection, skip and limit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed filter values or unknown fields.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count_documents(&self) -> Result<u64, AppError>;

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Same as [`Self::count_documents`], plus unknown sort fields.
    async fn exec(self) -> Result<Vec<Document>, AppError>
    where
        Self: Sized;
}
