//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use super::pg_collection_query::PgCollectionQuery;
use crate::domain::entities::{NewUser, Role, USER_COLLECTION, User, UserPatch, active_users};
use crate::domain::query::{CollectionQuery, Page, QueryRequest};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

const USER_COLUMNS: &str = "id, name, email, avatar, password, password_changed_at, role, \
    active, password_reset_token, password_reset_expires_at, created_at, updated_at, version";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    avatar: Option<String>,
    password: String,
    password_changed_at: Option<DateTime<Utc>>,
    role: String,
    active: bool,
    password_reset_token: Option<String>,
    password_reset_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|reason| {
            AppError::internal("Corrupt user row", json!({ "id": row.id, "reason": reason }))
        })?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            avatar: row.avatar,
            password: row.password,
            password_changed_at: row.password_changed_at,
            role,
            active: row.active,
            password_reset_token: row.password_reset_token,
            password_reset_expires_at: row.password_reset_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

/// PostgreSQL repository for user accounts.
///
/// Deactivated users are invisible to every lookup.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_user(
        &self,
        mut qb: QueryBuilder<'static, Postgres>,
    ) -> Result<Option<User>, AppError> {
        qb.build_query_as::<UserRow>()
            .fetch_optional(self.pool.as_ref())
            .await?
            .map(User::try_from)
            .transpose()
    }
}

fn user_not_found(id: i64) -> AppError {
    AppError::not_found("No user found with that ID", json!({ "id": id }))
}

fn update_query(id: i64, patch: UserPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(v) = patch.name {
            set.push("name = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.email {
            set.push("email = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.avatar {
            set.push("avatar = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.role {
            set.push("role = ").push_bind_unseparated(v.as_str().to_string());
        }
        set.push("updated_at = now()");
        set.push("version = version + 1");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" AND active RETURNING ");
    qb.push(USER_COLUMNS);
    qb
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self, request: QueryRequest) -> Result<Page, AppError> {
        let mut query = PgCollectionQuery::new(self.pool.clone(), &USER_COLLECTION);
        query.find(active_users());
        Page::fetch(query, request).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let mut qb = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE id = "));
        qb.push_bind(id).push(" AND active");
        self.fetch_user(qb).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower("
        ));
        qb.push_bind(email.to_string()).push(") AND active");
        self.fetch_user(qb).await
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE password_reset_token = "
        ));
        qb.push_bind(token_hash.to_string())
            .push(" AND password_reset_expires_at > ")
            .push_bind(now)
            .push(" AND active");
        self.fetch_user(qb).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, avatar, password, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.avatar)
        .bind(new_user.password)
        .bind(new_user.role.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        User::try_from(row)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User, AppError> {
        self.fetch_user(update_query(id, patch))
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    async fn set_password(
        &self,
        id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET password = $2,
                password_changed_at = $3,
                password_reset_token = NULL,
                password_reset_expires_at = NULL,
                updated_at = now(),
                version = version + 1
            WHERE id = $1 AND active
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(password_hash)
        .bind(changed_at)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| user_not_found(id))?;

        User::try_from(row)
    }

    async fn set_reset_token(
        &self,
        id: i64,
        token_hash: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = $2, password_reset_expires_at = $3
            WHERE id = $1 AND active
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET active = FALSE, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_skips_inactive_users() {
        let patch = UserPatch {
            email: Some("new@example.com".to_string()),
            role: Some(Role::Guide),
            ..Default::default()
        };

        let sql = update_query(9, patch).into_sql();
        assert!(sql.starts_with("UPDATE users SET email = $1, role = $2, updated_at = now()"));
        assert!(sql.contains("WHERE id = $3 AND active RETURNING id, name, email"));
    }
}
