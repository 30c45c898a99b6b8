//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod reviews;
pub mod tours;
pub mod users;

pub use health::health_handler;
pub use reviews::{
    create_review_handler, create_tour_review_handler, list_reviews_handler,
    list_tour_reviews_handler,
};
pub use tours::{
    create_tour_handler, delete_tour_handler, get_tour_handler, list_tours_handler,
    monthly_plan_handler, top_cheap_tours_handler, tour_stats_handler, update_tour_handler,
};
pub use users::{
    create_user_handler, delete_me_handler, forgot_password_handler, get_user_handler,
    list_users_handler, login_handler, reset_password_handler, signup_handler,
    update_me_handler, update_password_handler,
};
