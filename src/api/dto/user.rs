//! DTOs for user and authentication endpoints.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::application::services::Registration;
use crate::domain::entities::{Role, User, UserPatch};

/// Something that looks like `x@y.z`.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

/// A missing confirmation is reported by `required`, not here.
fn passwords_match(
    password: &Option<String>,
    confirm: &Option<String>,
) -> Result<(), ValidationError> {
    match (password, confirm) {
        (Some(password), Some(confirm)) if password != confirm => {
            Err(ValidationError::new("must_match")
                .with_message(Cow::Borrowed("Passwords do not match")))
        }
        _ => Ok(()),
    }
}

fn signup_passwords_match(req: &SignupRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn reset_passwords_match(req: &ResetPasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn update_passwords_match(req: &UpdatePasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

/// Request body for `POST /api/v1/users/signup`.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "signup_passwords_match"))]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(
        required(message = "User must have a name"),
        length(min = 1, message = "User must have a name")
    )]
    pub name: Option<String>,

    #[validate(required(message = "User must have an email"))]
    #[validate(regex(path = "*EMAIL_REGEX", message = "Please enter a valid email"))]
    pub email: Option<String>,

    #[validate(
        required(message = "User must have a password"),
        length(min = 8, message = "Password must have at least 8 characters")
    )]
    pub password: Option<String>,

    #[validate(required(message = "Please confirm your password"))]
    pub password_confirm: Option<String>,

    pub avatar: Option<String>,
}

impl SignupRequest {
    /// Converts a validated request. Returns `None` if a required field is missing.
    pub fn into_registration(self) -> Option<Registration> {
        Some(Registration {
            name: self.name?.trim().to_string(),
            email: self.email?,
            password: self.password?,
            avatar: self.avatar,
        })
    }
}

/// Request body for `POST /api/v1/users` (admin only).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(required(message = "Please provide name, email, and password"))]
    pub name: Option<String>,

    #[validate(required(message = "Please provide name, email, and password"))]
    #[validate(regex(path = "*EMAIL_REGEX", message = "Please enter a valid email"))]
    pub email: Option<String>,

    #[validate(
        required(message = "Please provide name, email, and password"),
        length(min = 8, message = "Password must have at least 8 characters")
    )]
    pub password: Option<String>,

    pub avatar: Option<String>,

    pub role: Option<Role>,
}

impl CreateUserRequest {
    pub fn into_registration(self) -> Option<(Registration, Role)> {
        let registration = Registration {
            name: self.name?.trim().to_string(),
            email: self.email?,
            password: self.password?,
            avatar: self.avatar,
        };
        Some((registration, self.role.unwrap_or(Role::User)))
    }
}

/// Request body for `POST /api/v1/users/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Please provide email and password"))]
    pub email: Option<String>,

    #[validate(required(message = "Please provide email and password"))]
    pub password: Option<String>,
}

/// Request body for `POST /api/v1/users/forgotPassword`.
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(required(message = "Please provide your email"))]
    pub email: Option<String>,
}

/// Request body for `PATCH /api/v1/users/resetPassword/{token}`.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "reset_passwords_match"))]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(
        required(message = "User must have a password"),
        length(min = 8, message = "Password must have at least 8 characters")
    )]
    pub password: Option<String>,

    #[validate(required(message = "Please confirm your password"))]
    pub password_confirm: Option<String>,
}

/// Request body for `PATCH /api/v1/users/updatePassword`.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "update_passwords_match"))]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(required(message = "Please provide your current password"))]
    pub password_current: Option<String>,

    #[validate(
        required(message = "User must have a password"),
        length(min = 8, message = "Password must have at least 8 characters")
    )]
    pub password: Option<String>,

    #[validate(required(message = "Please confirm your password"))]
    pub password_confirm: Option<String>,
}

/// Request body for `PATCH /api/v1/users/updateMe`.
///
/// Password fields are accepted only to be rejected with a pointer to
/// `updatePassword`; any other unknown field is ignored.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, message = "User must have a name"))]
    pub name: Option<String>,

    #[validate(regex(path = "*EMAIL_REGEX", message = "Please enter a valid email"))]
    pub email: Option<String>,

    pub avatar: Option<String>,

    pub password: Option<String>,

    pub password_confirm: Option<String>,
}

impl UpdateMeRequest {
    pub fn touches_password(&self) -> bool {
        self.password.is_some() || self.password_confirm.is_some()
    }
}

impl From<UpdateMeRequest> for UserPatch {
    fn from(req: UpdateMeRequest) -> Self {
        UserPatch {
            name: req.name.map(|n| n.trim().to_string()),
            email: req.email,
            avatar: req.avatar,
            role: None,
        }
    }
}

/// `{ "user": ... }`
#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}

/// Response of every endpoint that signs the user in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub token: String,
    pub data: UserData,
}

impl AuthResponse {
    pub fn new(user: User, token: String) -> Self {
        Self {
            status: "success",
            token,
            data: UserData { user },
        }
    }
}
