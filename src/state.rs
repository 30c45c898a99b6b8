//! Shared application state handed to every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AuthService, AuthSettings, ReviewService, TourService, UserService,
};
use crate::domain::repositories::{ReviewRepository, TourRepository, UserRepository};
use crate::infrastructure::mailer::Mailer;
use crate::infrastructure::memory::{
    MemoryReviewRepository, MemoryStore, MemoryTourRepository, MemoryUserRepository,
};
use crate::infrastructure::persistence::{PgReviewRepository, PgTourRepository, PgUserRepository};

pub type DynTourService = TourService<dyn TourRepository>;
pub type DynReviewService = ReviewService<dyn ReviewRepository, dyn TourRepository>;
pub type DynUserService = UserService<dyn UserRepository>;
pub type DynAuthService = AuthService<dyn UserRepository, dyn Mailer>;

/// Repository set backing one [`AppState`].
#[derive(Clone)]
pub struct Repositories {
    pub tours: Arc<dyn TourRepository>,
    pub users: Arc<dyn UserRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl Repositories {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            tours: Arc::new(PgTourRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            reviews: Arc::new(PgReviewRepository::new(pool)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            tours: Arc::new(MemoryTourRepository::new(store.clone())),
            users: Arc::new(MemoryUserRepository::new(store.clone())),
            reviews: Arc::new(MemoryReviewRepository::new(store)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub tour_service: Arc<DynTourService>,
    pub review_service: Arc<DynReviewService>,
    pub user_service: Arc<DynUserService>,
    pub auth_service: Arc<DynAuthService>,
}

impl AppState {
    pub fn new(repositories: Repositories, mailer: Arc<dyn Mailer>, auth: AuthSettings) -> Self {
        let Repositories {
            tours,
            users,
            reviews,
        } = repositories;

        Self {
            tour_service: Arc::new(TourService::new(tours.clone())),
            review_service: Arc::new(ReviewService::new(reviews, tours)),
            user_service: Arc::new(UserService::new(users.clone())),
            auth_service: Arc::new(AuthService::new(users, mailer, auth)),
        }
    }
}
