//! API route configuration.
//!
//! Routes are mounted under `/api/v1` by [`crate::routes::app_router`].
//! Protected routes require a Bearer JWT via [`auth::protect`]; some further
//! require a role via [`auth::restrict_to`].

use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, patch, post},
};

use crate::api::handlers::{
    create_review_handler, create_tour_handler, create_tour_review_handler, create_user_handler,
    delete_me_handler, delete_tour_handler, forgot_password_handler, get_tour_handler,
    get_user_handler, list_reviews_handler, list_tour_reviews_handler, list_tours_handler,
    list_users_handler, login_handler, monthly_plan_handler, reset_password_handler,
    signup_handler, top_cheap_tours_handler, tour_stats_handler, update_me_handler,
    update_password_handler, update_tour_handler,
};
use crate::api::middleware::auth;
use crate::domain::entities::Role;
use crate::state::AppState;

const TOUR_EDITORS: &[Role] = &[Role::Admin, Role::LeadGuide];
const TOUR_PLANNERS: &[Role] = &[Role::Admin, Role::LeadGuide, Role::Guide];
const REVIEWERS: &[Role] = &[Role::User];
const ADMINS: &[Role] = &[Role::Admin];

/// Requires an authenticated user.
fn protected(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(state.clone(), auth::protect))
}

/// Requires an authenticated user with one of `roles`.
fn restricted(
    route: MethodRouter<AppState>,
    state: &AppState,
    roles: &'static [Role],
) -> MethodRouter<AppState> {
    protected(
        route.route_layer(middleware::from_fn_with_state(roles, auth::restrict_to)),
        state,
    )
}

/// Public credential endpoints.
///
/// - `POST  /users/signup`
/// - `POST  /users/login`
/// - `POST  /users/forgotPassword`
/// - `PATCH /users/resetPassword/{token}`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup_handler))
        .route("/users/login", post(login_handler))
        .route("/users/forgotPassword", post(forgot_password_handler))
        .route("/users/resetPassword/{token}", patch(reset_password_handler))
}

/// Tour, review and user resources.
///
/// # Endpoints
///
/// - `GET    /tours`                      - List tours (public)
/// - `POST   /tours`                      - Create a tour (admin, lead-guide)
/// - `GET    /tours/top-5-cheap`          - Five best rated, cheapest first (public)
/// - `GET    /tours/stats`                - Statistics per difficulty (public)
/// - `GET    /tours/monthly-plan/{year}`  - Tour starts per month (admin, lead-guide, guide)
/// - `GET    /tours/{id}`                 - Get a tour (public)
/// - `PATCH  /tours/{id}`                 - Update a tour (admin, lead-guide)
/// - `DELETE /tours/{id}`                 - Delete a tour (admin, lead-guide)
/// - `GET    /tours/{id}/reviews`         - Reviews of a tour (signed in)
/// - `POST   /tours/{id}/reviews`         - Review a tour (user)
/// - `GET    /reviews`                    - List reviews (signed in)
/// - `POST   /reviews`                    - Create a review (user)
/// - `PATCH  /users/updatePassword`       - Change own password (signed in)
/// - `PATCH  /users/updateMe`             - Update own profile (signed in)
/// - `DELETE /users/deleteMe`             - Deactivate own account (signed in)
/// - `GET    /users`                      - List users (admin)
/// - `POST   /users`                      - Create a user (admin)
/// - `GET    /users/{id}`                 - Get a user (self or admin)
pub fn resource_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/tours",
            get(list_tours_handler).merge(restricted(post(create_tour_handler), state, TOUR_EDITORS)),
        )
        .route("/tours/top-5-cheap", get(top_cheap_tours_handler))
        .route("/tours/stats", get(tour_stats_handler))
        .route(
            "/tours/monthly-plan/{year}",
            restricted(get(monthly_plan_handler), state, TOUR_PLANNERS),
        )
        .route(
            "/tours/{id}",
            get(get_tour_handler).merge(restricted(
                patch(update_tour_handler).delete(delete_tour_handler),
                state,
                TOUR_EDITORS,
            )),
        )
        .route(
            "/tours/{id}/reviews",
            protected(get(list_tour_reviews_handler), state)
                .merge(restricted(post(create_tour_review_handler), state, REVIEWERS)),
        )
        .route(
            "/reviews",
            protected(get(list_reviews_handler), state)
                .merge(restricted(post(create_review_handler), state, REVIEWERS)),
        )
        .route(
            "/users/updatePassword",
            protected(patch(update_password_handler), state),
        )
        .route("/users/updateMe", protected(patch(update_me_handler), state))
        .route("/users/deleteMe", protected(delete(delete_me_handler), state))
        .route(
            "/users",
            restricted(get(list_users_handler).post(create_user_handler), state, ADMINS),
        )
        .route("/users/{id}", protected(get(get_user_handler), state))
}

/// All API routes without rate limiting.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    auth_routes().merge(resource_routes(state))
}
