//! Shared in-process storage for the memory repositories.

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::entities::{Review, Tour, User};
use crate::domain::query::Document;
use crate::error::AppError;

/// Tables of the in-memory backend.
///
/// Locks are never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(super) tours: RwLock<Vec<Tour>>,
    pub(super) users: RwLock<Vec<User>>,
    pub(super) reviews: RwLock<Vec<Review>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an ID unique across all tables.
    pub(super) fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub(super) fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, AppError> {
    lock.read().map_err(poisoned)
}

pub(super) fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, AppError> {
    lock.write().map_err(poisoned)
}

fn poisoned<T>(_: PoisonError<T>) -> AppError {
    AppError::internal("Memory store lock poisoned", json!({}))
}

/// Serializes an entity into a document keyed by public field names.
pub(super) fn to_document<T: Serialize>(entity: &T) -> Result<Document, AppError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::internal(
            "Entity did not serialize to an object",
            json!({}),
        )),
        Err(e) => Err(AppError::internal(
            "Failed to serialize entity",
            json!({ "reason": e.to_string() }),
        )),
    }
}
