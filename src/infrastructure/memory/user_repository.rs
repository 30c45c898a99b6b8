//! In-memory user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

use super::collection_query::MemoryCollectionQuery;
use super::store::{MemoryStore, read, to_document, write};
use crate::domain::entities::{NewUser, USER_COLLECTION, User, UserPatch, active_users};
use crate::domain::query::{CollectionQuery, Document, Page, QueryRequest};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn with_active_user<T>(
        &self,
        id: i64,
        apply: impl FnOnce(&mut User) -> T,
    ) -> Result<T, AppError> {
        let mut users = write(&self.store.users)?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id && u.active)
            .ok_or_else(|| AppError::not_found("No user found with that ID", json!({ "id": id })))?;
        Ok(apply(user))
    }
}

/// Documents keep the hidden `active` flag so the base filter can see it.
fn user_document(user: &User) -> Result<Document, AppError> {
    let mut document = to_document(user)?;
    document.insert("active".to_string(), Value::Bool(user.active));
    Ok(document)
}

fn email_taken(users: &[User], email: &str, except: Option<i64>) -> bool {
    users
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn list(&self, request: QueryRequest) -> Result<Page, AppError> {
        let documents = read(&self.store.users)?
            .iter()
            .map(user_document)
            .collect::<Result<Vec<_>, _>>()?;

        let mut query = MemoryCollectionQuery::new(&USER_COLLECTION, documents);
        query.find(active_users());
        Page::fetch(query, request).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(read(&self.store.users)?
            .iter()
            .find(|u| u.id == id && u.active)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(read(&self.store.users)?
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.active)
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        Ok(read(&self.store.users)?
            .iter()
            .find(|u| {
                u.active
                    && u.password_reset_token.as_deref() == Some(token_hash)
                    && u.password_reset_expires_at.is_some_and(|at| at > now)
            })
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = write(&self.store.users)?;

        if email_taken(&users, &new_user.email, None) {
            return Err(AppError::duplicate(json!({ "field": "email" })));
        }

        let now = Utc::now();
        let user = User {
            id: self.store.next_id(),
            name: new_user.name,
            email: new_user.email,
            avatar: new_user.avatar,
            password: new_user.password,
            password_changed_at: None,
            role: new_user.role,
            active: true,
            password_reset_token: None,
            password_reset_expires_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User, AppError> {
        if let Some(email) = &patch.email
            && email_taken(&read(&self.store.users)?, email, Some(id))
        {
            return Err(AppError::duplicate(json!({ "field": "email" })));
        }

        self.with_active_user(id, |user| {
            if let Some(v) = patch.name {
                user.name = v;
            }
            if let Some(v) = patch.email {
                user.email = v;
            }
            if let Some(v) = patch.avatar {
                user.avatar = Some(v);
            }
            if let Some(v) = patch.role {
                user.role = v;
            }
            user.updated_at = Utc::now();
            user.version += 1;
            user.clone()
        })
    }

    async fn set_password(
        &self,
        id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<User, AppError> {
        self.with_active_user(id, |user| {
            user.password = password_hash.to_string();
            user.password_changed_at = Some(changed_at);
            user.password_reset_token = None;
            user.password_reset_expires_at = None;
            user.updated_at = Utc::now();
            user.version += 1;
            user.clone()
        })
    }

    async fn set_reset_token(
        &self,
        id: i64,
        token_hash: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        self.with_active_user(id, |user| {
            user.password_reset_token = token_hash;
            user.password_reset_expires_at = expires_at;
        })
    }

    async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let mut users = write(&self.store.users)?;
        match users.iter_mut().find(|u| u.id == id && u.active) {
            Some(user) => {
                user.active = false;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
