//! Bearer token authentication and role checks.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::domain::entities::{Role, User};
use crate::{error::AppError, state::AppState};

/// The authenticated principal, inserted into request extensions by [`protect`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticates requests using a JWT from the `Authorization` header.
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// On success the user is available to handlers as `Extension<CurrentUser>`.
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - the header is missing or not a Bearer token
/// - the token is invalid or expired
/// - the user no longer exists or was deactivated
/// - the password changed after the token was issued
///
/// # Example
///
/// ```rust,ignore
/// let route = get(update_me_handler)
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::protect));
/// ```
pub async fn protect(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "You are not logged in. Please log in.",
                json!({ "reason": "Authorization header is missing or invalid" }),
            )
        })?;

    let user = st.auth_service.authenticate(&token).await?;
    tracing::debug!(user_id = user.id, role = %user.role, "Authenticated request");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Allows the request through only if the authenticated user has one of `roles`.
///
/// Must run after [`protect`].
///
/// # Errors
///
/// Returns `401 Unauthorized` if no user was authenticated.
/// Returns `403 Forbidden` if the user's role is not listed.
pub async fn restrict_to(
    State(roles): State<&'static [Role]>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(CurrentUser(user)) = req.extensions().get::<CurrentUser>() else {
        return Err(AppError::unauthorized(
            "You are not logged in. Please log in.",
            json!({}),
        ));
    };

    if !user.has_any_role(roles) {
        return Err(AppError::forbidden(
            "Unauthorized to access this route",
            json!({ "role": user.role, "allowed": roles }),
        ));
    }

    Ok(next.run(req).await)
}
