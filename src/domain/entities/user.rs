//! User entity and its collection schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use std::str::FromStr;

use crate::domain::query::{CollectionSchema, FieldDef, FieldKind, Filter};

/// Authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "guide" => Ok(Role::Guide),
            "lead-guide" => Ok(Role::LeadGuide),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// A registered user.
///
/// Credentials and account state never leave the service: `password`,
/// `active` and the reset token fields are skipped during serialization.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub active: bool,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "__v")]
    pub version: i32,
}

impl User {
    /// Returns true if the password changed after a token issued at `issued_at`
    /// (seconds since the epoch).
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        self.password_changed_at
            .is_some_and(|changed| issued_at < changed.timestamp())
    }

    /// Returns true if `role` is one of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Input data for creating a user. `password` is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub password: String,
    pub role: Role,
}

/// Partial update for an existing user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
}

const USER_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "id", FieldKind::Id),
    FieldDef::new("name", "name", FieldKind::Text),
    FieldDef::new("email", "email", FieldKind::Text),
    FieldDef::new("avatar", "avatar", FieldKind::Text),
    FieldDef::new("role", "role", FieldKind::Text),
    FieldDef::new("passwordChangedAt", "password_changed_at", FieldKind::Timestamp),
    FieldDef::hidden("active", "active", FieldKind::Bool),
    FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    FieldDef::new("updatedAt", "updated_at", FieldKind::Timestamp),
    FieldDef::new("__v", "version", FieldKind::Integer),
];

/// Queryable shape of the `users` collection.
pub const USER_COLLECTION: CollectionSchema = CollectionSchema {
    name: "users",
    table: "users",
    fields: USER_FIELDS,
};

/// Base condition of every user query: deactivated accounts are never returned.
pub fn active_users() -> Filter {
    Filter::new().ne("active", "false")
}
