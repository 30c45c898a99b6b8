#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tours_api::api::routes::api_routes;
use tours_api::application::services::{AuthSettings, Registration};
use tours_api::domain::entities::{Difficulty, NewTour, Role, Tour, User};
use tours_api::infrastructure::mailer::MemoryMailer;
use tours_api::infrastructure::memory::MemoryStore;
use tours_api::state::{AppState, Repositories};

pub const TEST_PASSWORD: &str = "test1234";

static NEXT_USER: AtomicUsize = AtomicUsize::new(1);

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub mailer: Arc<MemoryMailer>,
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-signing-secret-0123456789".to_string(),
        jwt_expires_in: Duration::days(1),
        password_reset_ttl: Duration::minutes(10),
        bcrypt_cost: 4,
        public_url: "http://localhost:3000".to_string(),
    }
}

pub fn create_test_state_with_mailer(mailer: Arc<MemoryMailer>) -> AppState {
    let repositories = Repositories::memory(Arc::new(MemoryStore::new()));
    AppState::new(repositories, mailer, auth_settings())
}

pub fn create_test_state() -> (AppState, Arc<MemoryMailer>) {
    let mailer = Arc::new(MemoryMailer::new());
    (create_test_state_with_mailer(mailer.clone()), mailer)
}

/// API routes mounted under `/api/v1`, without rate limiting.
pub fn create_test_app_with_state(state: AppState, mailer: Arc<MemoryMailer>) -> TestApp {
    let app = Router::new()
        .nest("/api/v1", api_routes(&state))
        .with_state(state.clone());

    TestApp {
        server: TestServer::new(app).unwrap(),
        state,
        mailer,
    }
}

pub fn create_test_app() -> TestApp {
    let (state, mailer) = create_test_state();
    create_test_app_with_state(state, mailer)
}

pub async fn create_test_user(state: &AppState, role: Role) -> User {
    let n = NEXT_USER.fetch_add(1, Ordering::Relaxed);
    create_named_user(state, &format!("Test User {}", n), &format!("user{}@example.com", n), role)
        .await
}

pub async fn create_named_user(state: &AppState, name: &str, email: &str, role: Role) -> User {
    state
        .auth_service
        .register(
            Registration {
                name: name.to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                avatar: None,
            },
            role,
        )
        .await
        .unwrap()
}

/// A user with `role` and a valid token for them.
pub async fn create_user_with_token(state: &AppState, role: Role) -> (User, String) {
    let user = create_test_user(state, role).await;
    let token = state.auth_service.issue_token(user.id).unwrap();
    (user, token)
}

pub fn new_tour(name: &str, price: f64) -> NewTour {
    NewTour {
        name: name.to_string(),
        slug: String::new(),
        duration: 5,
        difficulty: Difficulty::Easy,
        rating: 4.5,
        ratings_average: 4.5,
        ratings_quantity: 0,
        max_group_size: 10,
        price,
        price_discount: None,
        summary: None,
        description: None,
        image_cover: "cover.jpg".to_string(),
        images: Vec::new(),
        start_dates: Vec::new(),
        secret_tour: false,
    }
}

pub async fn create_test_tour(state: &AppState, name: &str, price: f64) -> Tour {
    state
        .tour_service
        .create_tour(new_tour(name, price))
        .await
        .unwrap()
}

pub async fn create_custom_tour(state: &AppState, new_tour: NewTour) -> Tour {
    state.tour_service.create_tour(new_tour).await.unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}
