//! Handlers for authentication and user account endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::response::{ListResponse, MessageResponse, Success};
use crate::api::dto::user::{
    AuthResponse, CreateUserRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
    SignupRequest, UpdateMeRequest, UpdatePasswordRequest, UserData,
};
use crate::api::middleware::CurrentUser;
use crate::domain::query::QueryRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new account with role `user` and signs it in.
///
/// # Endpoint
///
/// `POST /api/v1/users/signup`
///
/// # Errors
///
/// Returns 400 on missing or invalid fields, mismatched passwords or a
/// duplicate email.
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let registration = payload
        .into_registration()
        .ok_or_else(|| AppError::bad_request("Missing required user fields", json!({})))?;

    let (user, token) = state.auth_service.signup(registration).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, token))))
}

/// # Endpoint
///
/// `POST /api/v1/users/login`
///
/// # Errors
///
/// Returns 400 if email or password is missing.
/// Returns 401 on wrong credentials.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::bad_request(
            "Please provide email and password",
            json!({}),
        ));
    };

    let (user, token) = state.auth_service.login(&email, &password).await?;

    Ok(Json(AuthResponse::new(user, token)))
}

/// Mails a one-time password reset link.
///
/// # Endpoint
///
/// `POST /api/v1/users/forgotPassword`
///
/// # Errors
///
/// Returns 404 for an unknown email.
/// Returns 500 if the email could not be sent.
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let email = payload.email.unwrap_or_default();
    state.auth_service.forgot_password(&email).await?;

    Ok(Json(MessageResponse::new("Token sent to email!")))
}

/// Sets a new password using a reset token and signs the user in.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/resetPassword/{token}`
///
/// # Errors
///
/// Returns 400 if the token is invalid or expired, or the passwords are invalid.
pub async fn reset_password_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let password = payload.password.unwrap_or_default();
    let (user, token) = state.auth_service.reset_password(&token, password).await?;

    Ok(Json(AuthResponse::new(user, token)))
}

/// Changes the signed-in user's password.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/updatePassword`
///
/// # Errors
///
/// Returns 400 on invalid new passwords.
/// Returns 401 if the current password is wrong.
pub async fn update_password_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let current = payload.password_current.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    let (user, token) = state
        .auth_service
        .update_password(&user, &current, password)
        .await?;

    Ok(Json(AuthResponse::new(user, token)))
}

/// Updates name, email or avatar of the signed-in user.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/updateMe`
///
/// # Errors
///
/// Returns 400 if the body carries password fields, on invalid fields, or on
/// a duplicate email.
pub async fn update_me_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<Success<UserData>>, AppError> {
    if payload.touches_password() {
        return Err(AppError::bad_request(
            "This route is not for password updates. Please use /updatePassword.",
            json!({}),
        ));
    }
    payload.validate()?;

    let user = state.user_service.update_me(user.id, payload.into()).await?;

    Ok(Json(Success::new(UserData { user })))
}

/// Deactivates the signed-in user's account.
///
/// # Endpoint
///
/// `DELETE /api/v1/users/deleteMe`
pub async fn delete_me_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.user_service.delete_me(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists active users. Requires role `admin`.
///
/// # Endpoint
///
/// `GET /api/v1/users`
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(request): Query<QueryRequest>,
) -> Result<Json<ListResponse>, AppError> {
    let page = state.user_service.list_users(request).await?;
    Ok(Json(ListResponse::new("users", page)))
}

/// Creates an account without signing in. Requires role `admin`.
///
/// # Endpoint
///
/// `POST /api/v1/users`
///
/// # Errors
///
/// Returns 400 if name, email or password is missing, or on a duplicate email.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Success<UserData>>), AppError> {
    payload.validate()?;

    let (registration, role) = payload.into_registration().ok_or_else(|| {
        AppError::bad_request("Please provide name, email, and password", json!({}))
    })?;

    let user = state.auth_service.register(registration, role).await?;
    tracing::info!(user_id = user.id, role = %user.role, "User created");

    Ok((StatusCode::CREATED, Json(Success::new(UserData { user }))))
}

/// # Endpoint
///
/// `GET /api/v1/users/{id}`
///
/// # Errors
///
/// Returns 401 unless the caller is this user or an admin.
/// Returns 404 if the user does not exist.
pub async fn get_user_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(requester)): Extension<CurrentUser>,
) -> Result<Json<Success<UserData>>, AppError> {
    let user = state.user_service.get_user(&requester, id).await?;
    Ok(Json(Success::new(UserData { user })))
}
