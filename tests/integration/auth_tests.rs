//! Registration, login lockouts and the account endpoints

use crate::common::TestContext;
use crate::common::fixtures::{self, PASSWORD};
use crate::{call, test_app};
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;

fn login(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
}

#[actix_web::test]
async fn test_register_returns_token_and_profile() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let (status, body) = call!(
        app,
        TestRequest::post().uri("/api/auth/register").set_json(json!({
            "name": "Alice",
            "email": "Alice@Example.com",
            "password": "secret1"
        }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = call!(
        app,
        TestRequest::post().uri("/api/auth/register").set_json(json!({
            "name": "Alice Again",
            "email": "alice@example.com",
            "password": "secret1"
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User already exists");
}

#[actix_web::test]
async fn test_register_rejects_short_password() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let (status, body) = call!(
        app,
        TestRequest::post().uri("/api/auth/register").set_json(json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "123"
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_login_and_me() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    ctx.user("Carol", "carol@example.com").await;

    let (status, body) = call!(app, login("carol@example.com", PASSWORD));
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = call!(
        app,
        TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Carol");
    assert_eq!(body["data"]["workspaces"], json!([]));
}

#[actix_web::test]
async fn test_bad_credentials_are_indistinguishable() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    ctx.user("Dan", "dan@example.com").await;

    let (status, wrong_password) = call!(app, login("dan@example.com", "nope-nope"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown_email) = call!(app, login("nobody@example.com", PASSWORD));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    assert_eq!(wrong_password["code"], "UNAUTHORIZED");
}

#[actix_web::test]
async fn test_repeated_failures_lock_out_login() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    ctx.user("Eve", "eve@example.com").await;

    let attempts = ctx.state.config.app.rate_limit.max_attempts;
    for _ in 0..attempts {
        let (status, _) = call!(app, login("eve@example.com", "wrong-password"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused during the lockout
    let (status, body) = call!(app, login("eve@example.com", PASSWORD));
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
}

#[actix_web::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let (status, _) = call!(app, TestRequest::get().uri("/api/auth/me"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(
        app,
        TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_change_password() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let frank = ctx.user("Frank", "frank@example.com").await;

    let (status, _) = call!(
        app,
        fixtures::post(
            "/api/auth/change-password",
            &frank,
            json!({ "currentPassword": "wrong-one", "newPassword": "brand-new" })
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        app,
        fixtures::post(
            "/api/auth/change-password",
            &frank,
            json!({ "currentPassword": PASSWORD, "newPassword": "brand-new" })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    let (status, _) = call!(app, login("frank@example.com", "brand-new"));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_unknown_route_uses_error_envelope() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let (status, body) = call!(app, TestRequest::get().uri("/api/nothing-here"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found", "code": "NOT_FOUND" }));

    let (status, body) = call!(app, TestRequest::get().uri("/api/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Server is running");
}
