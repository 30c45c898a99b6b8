//! User account management service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Role, User, UserPatch};
use crate::domain::query::{Page, QueryRequest};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Service for reading and maintaining user profiles.
pub struct UserService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists active users shaped by the query string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed filter values or unknown fields.
    pub async fn list_users(&self, request: QueryRequest) -> Result<Page, AppError> {
        self.repository.list(request).await
    }

    /// Fetches a user on behalf of `requester`.
    ///
    /// Only the user themself or an admin may read a profile.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when `requester` is someone else.
    /// Returns [`AppError::NotFound`] if no active user has this ID.
    pub async fn get_user(&self, requester: &User, id: i64) -> Result<User, AppError> {
        if requester.id != id && requester.role != Role::Admin {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "requester": requester.id, "id": id }),
            ));
        }

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("No user found with that ID", json!({ "id": id })))
    }

    /// Updates the caller's own profile. Roles cannot be changed this way.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] on a duplicate email.
    pub async fn update_me(&self, id: i64, mut patch: UserPatch) -> Result<User, AppError> {
        patch.role = None;
        if let Some(email) = patch.email.take() {
            patch.email = Some(email.to_lowercase());
        }
        self.repository.update(id, patch).await
    }

    /// Deactivates the caller's account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account is already inactive.
    pub async fn delete_me(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.deactivate(id).await? {
            return Err(AppError::not_found(
                "No user found with that ID",
                json!({ "id": id }),
            ));
        }

        tracing::info!(user_id = id, "User deactivated");
        Ok(())
    }

    /// Grants a role to the user with the given email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active user has this email.
    pub async fn set_role(&self, email: &str, role: Role) -> Result<User, AppError> {
        let user = self
            .repository
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| {
                AppError::not_found("No user found with that email", json!({ "email": email }))
            })?;

        let patch = UserPatch {
            role: Some(role),
            ..Default::default()
        };
        self.repository.update(user.id, patch).await
    }
}
