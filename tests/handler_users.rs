mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use tours_api::domain::entities::Role;

#[tokio::test]
async fn test_update_me_changes_profile() {
    let app = common::create_test_app();
    let (user, token) = common::create_user_with_token(&app.state, Role::User).await;

    let response = app
        .server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Renamed", "email": "Renamed@Example.com", "role": "admin" }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["name"], "Renamed");
    assert_eq!(json["data"]["user"]["email"], "renamed@example.com");
    assert_eq!(json["data"]["user"]["role"], "user");
}

#[tokio::test]
async fn test_update_me_rejects_password_fields() {
    let app = common::create_test_app();
    let (_, token) = common::create_user_with_token(&app.state, Role::User).await;

    let response = app
        .server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .json(&json!({ "password": "newpass123", "passwordConfirm": "newpass123" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["message"],
        "This route is not for password updates. Please use /updatePassword."
    );
}

#[tokio::test]
async fn test_update_me_duplicate_email() {
    let app = common::create_test_app();
    common::create_named_user(&app.state, "Taken", "taken@example.com", Role::User).await;
    let (_, token) = common::create_user_with_token(&app.state, Role::User).await;

    app.server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .json(&json!({ "email": "taken@example.com" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_delete_me_deactivates_account() {
    let app = common::create_test_app();
    let user =
        common::create_named_user(&app.state, "Gone", "gone@example.com", Role::User).await;
    let token = app.state.auth_service.issue_token(user.id).unwrap();

    app.server
        .delete("/api/v1/users/deleteMe")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .post("/api/v1/users/login")
        .json(&json!({ "email": "gone@example.com", "password": common::TEST_PASSWORD }))
        .await
        .assert_status_unauthorized();

    let (_, admin_token) = common::create_user_with_token(&app.state, Role::Admin).await;
    let response = app
        .server
        .get("/api/v1/users")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();

    let users = response.json::<Value>()["data"]["users"].clone();
    let users = users.as_array().unwrap();
    assert!(users.iter().all(|u| u["id"] != user.id));
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let app = common::create_test_app();
    let (_, token) = common::create_user_with_token(&app.state, Role::LeadGuide).await;

    let response = app
        .server
        .get("/api/v1/users")
        .authorization_bearer(&token)
        .await;

    response.assert_status_forbidden();
    assert_eq!(
        response.json::<Value>()["message"],
        "Unauthorized to access this route"
    );
}

#[tokio::test]
async fn test_list_users_hides_credentials() {
    let app = common::create_test_app();
    let (_, token) = common::create_user_with_token(&app.state, Role::Admin).await;
    common::create_named_user(&app.state, "Lisa Guide", "lisa@example.com", Role::Guide).await;

    let response = app
        .server
        .get("/api/v1/users")
        .authorization_bearer(&token)
        .add_query_param("name", "Lisa Guide")
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["results"], 1);

    let user = &json["data"]["users"][0];
    assert_eq!(user["role"], "guide");
    for hidden in ["password", "active", "passwordResetToken", "__v", "createdAt"] {
        assert!(user.get(hidden).is_none(), "{} leaked", hidden);
    }
}

#[tokio::test]
async fn test_create_user() {
    let app = common::create_test_app();
    let (_, token) = common::create_user_with_token(&app.state, Role::Admin).await;

    let response = app
        .server
        .post("/api/v1/users")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Steve T",
            "email": "steve@example.com",
            "password": "pass1234",
            "role": "guide"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["data"]["user"]["role"], "guide");
    assert!(json.get("token").is_none());
}

#[tokio::test]
async fn test_create_user_requires_admin() {
    let app = common::create_test_app();
    let (_, token) = common::create_user_with_token(&app.state, Role::User).await;
    let body = json!({
        "name": "Self Promoted",
        "email": "promoted@example.com",
        "password": "pass1234",
        "role": "admin"
    });

    let anonymous = app.server.post("/api/v1/users").json(&body).await;
    anonymous.assert_status_unauthorized();

    let response = app
        .server
        .post("/api/v1/users")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_create_user_missing_fields() {
    let app = common::create_test_app();
    let (_, token) = common::create_user_with_token(&app.state, Role::Admin).await;

    let response = app
        .server
        .post("/api/v1/users")
        .authorization_bearer(&token)
        .json(&json!({ "name": "No Email" }))
        .await;

    response.assert_status_bad_request();
    assert!(
        response.json::<Value>()["message"]
            .as_str()
            .unwrap()
            .contains("Please provide name, email, and password")
    );
}

#[tokio::test]
async fn test_get_user_self_or_admin() {
    let app = common::create_test_app();
    let (user, token) = common::create_user_with_token(&app.state, Role::User).await;
    let (other, _) = common::create_user_with_token(&app.state, Role::User).await;
    let (_, admin_token) = common::create_user_with_token(&app.state, Role::Admin).await;

    let response = app
        .server
        .get(&format!("/api/v1/users/{}", user.id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["user"]["email"], user.email);

    app.server
        .get(&format!("/api/v1/users/{}", other.id))
        .authorization_bearer(&token)
        .await
        .assert_status_unauthorized();

    app.server
        .get(&format!("/api/v1/users/{}", other.id))
        .authorization_bearer(&admin_token)
        .await
        .assert_status_ok();

    app.server
        .get("/api/v1/users/999999")
        .authorization_bearer(&admin_token)
        .await
        .assert_status_not_found();
}
