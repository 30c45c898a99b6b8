//! In-process backend implementing the repository traits.
//!
//! Documents are snapshotted into a [`MemoryCollectionQuery`] per request, so
//! list queries behave exactly like the PostgreSQL ones (filtering, ordering,
//! projection and paging) without a database. Used by the HTTP test suite and
//! for running the service with `STORAGE=memory`.

mod collection_query;
mod review_repository;
mod store;
mod tour_repository;
mod user_repository;

pub use collection_query::MemoryCollectionQuery;
pub use review_repository::MemoryReviewRepository;
pub use store::MemoryStore;
pub use tour_repository::MemoryTourRepository;
pub use user_repository::MemoryUserRepository;
