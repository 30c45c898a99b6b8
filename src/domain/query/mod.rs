//! Generic list-query support: request parameters, constraint values, the
//! [`CollectionQuery`] capability and the [`QueryBuilder`] that connects them.

pub mod builder;
pub mod collection;
pub mod filter;
pub mod request;
pub mod schema;

pub use builder::{Pagination, QueryBuilder};
pub use collection::{CollectionQuery, Document};
pub use filter::{Condition, Filter, Projection, SortDirection, SortKey, SortSpec};
pub use request::QueryRequest;
pub use schema::{CollectionSchema, FieldDef, FieldKind, TypedValue};

/// A page of documents with the total number of matches.
#[derive(Debug, Clone)]
pub struct Page {
    pub documents: Vec<Document>,
    pub total: u64,
    pub pagination: Pagination,
}

impl Page {
    /// Shapes a query from `request`, counts matches and executes it.
    ///
    /// # Errors
    ///
    /// Propagates query errors (malformed values, unknown fields, storage failures).
    pub async fn fetch<Q: CollectionQuery>(
        query: Q,
        request: QueryRequest,
    ) -> Result<Self, crate::error::AppError> {
        let builder = QueryBuilder::apply(query, request);
        let pagination = builder.pagination();
        let total = builder.count().await?;
        let documents = builder.into_query().exec().await?;

        Ok(Self {
            documents,
            total,
            pagination,
        })
    }
}
