mod common;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::Value;
use tours_api::routes::app_router;

fn full_app() -> TestServer {
    let (state, _) = common::create_test_state();
    let app = Router::new().fallback_service(app_router(state, true, "./no-such-static-dir"));
    TestServer::new(app).unwrap()
}

fn forwarded_for() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static("203.0.113.7"),
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = full_app();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let server = full_app();
    server.get("/health/").await.assert_status_ok();
}

#[tokio::test]
async fn test_api_served_under_version_prefix() {
    let server = full_app();
    let (name, value) = forwarded_for();

    let response = server.get("/api/v1/tours").add_header(name, value).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["results"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = full_app();
    let (name, value) = forwarded_for();

    let response = server
        .get("/api/v1/bookings")
        .add_header(name, value)
        .await;

    response.assert_status_not_found();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "fail");
    assert_eq!(
        json["message"],
        "Can't find /api/v1/bookings on this server!"
    );
}
