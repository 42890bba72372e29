//! HTTP-level tests for user registration, login and self-service.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json, put_json_auth, TestApp, TEST_CODE, TEST_PASSWORD,
    TEST_SECRET,
};
use happyhome_api::auth::jwt::Claims;
use happyhome_core::principal::PrincipalKind;
use jsonwebtoken::{encode, EncodingKey, Header};

async fn register(t: &TestApp, email: &str, password: &str) -> axum::response::Response {
    let body = serde_json::json!({
        "name": "Ada",
        "email": email,
        "password": password,
        "phone": "555-0100",
    });
    post_json(t.app(), "/api/v1/users/register", body).await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_creates_user_without_token() {
    let t = TestApp::new();

    let response = register(&t, "a@x.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Registration successful! Please log in.");
    assert_eq!(json["data"]["email"], "a@x.com");
    assert_eq!(json["data"]["role"], "user");
    assert_eq!(json["data"]["phone"], "555-0100");
    assert!(json["data"].get("token").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let t = TestApp::new();
    register(&t, "a@x.com", "secret1").await;

    let response = register(&t, "A@X.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Email already in use");
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let t = TestApp::new();

    let body = serde_json::json!({ "name": " ", "email": "nope", "password": "123" });
    let response = post_json(t.app(), "/api/v1/users/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Login + authentication
// ---------------------------------------------------------------------------

/// Verify an email, register it, log in, and read it back through `/me`.
#[tokio::test]
async fn test_verify_register_login_me_flow() {
    let t = TestApp::new();

    let response = post_json(
        t.app(),
        "/api/v1/otp/send-otp",
        serde_json::json!({ "email": "a@x.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        t.app(),
        "/api/v1/otp/verify-otp",
        serde_json::json!({ "email": "a@x.com", "otp": TEST_CODE }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        register(&t, "a@x.com", "secret1").await.status(),
        StatusCode::CREATED
    );
    let token = t.login("/api/v1/users/login", "a@x.com", "secret1").await;

    let response = get_auth(t.app(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "a@x.com");
    assert_eq!(json["data"]["kind"], "user");
}

#[tokio::test]
async fn test_user_login_wrong_password_issues_no_token() {
    let t = TestApp::new();
    t.seed_user("a@x.com", "user").await;

    let body = serde_json::json!({ "email": "a@x.com", "password": "wrong-password" });
    let response = post_json(t.app(), "/api/v1/users/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_CREDENTIALS");
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let t = TestApp::new();
    let user = t.seed_user("a@x.com", "user").await;

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        kind: PrincipalKind::User,
        role: "user".into(),
        exp: now - 60,
        iat: now - 3600,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = get_auth(t.app(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Token is invalid or expired"
    );
}

#[tokio::test]
async fn test_admin_token_rejected_on_user_routes() {
    let t = TestApp::new();
    t.seed_admin("admin@happyhome.com").await;
    let token = t
        .login("/api/v1/admin/login", "admin@happyhome.com", TEST_PASSWORD)
        .await;

    let response = get_auth(t.app(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Self-service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_deleted_user_token_stops_working() {
    let t = TestApp::new();
    t.seed_user("a@x.com", "user").await;
    let token = t.login("/api/v1/users/login", "a@x.com", TEST_PASSWORD).await;

    let response = delete_auth(t.app(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(t.app(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Account not found");
}

#[tokio::test]
async fn test_profile_update_email_conflict() {
    let t = TestApp::new();
    t.seed_user("a@x.com", "user").await;
    t.seed_user("b@x.com", "user").await;
    let token = t.login("/api/v1/users/login", "b@x.com", TEST_PASSWORD).await;

    let body = serde_json::json!({ "email": "a@x.com" });
    let response = put_json_auth(t.app(), "/api/v1/users/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Email already in use");
}

#[tokio::test]
async fn test_profile_update_phone_and_password() {
    let t = TestApp::new();
    t.seed_user("a@x.com", "user").await;
    let token = t.login("/api/v1/users/login", "a@x.com", TEST_PASSWORD).await;

    let body = serde_json::json!({
        "phone": "555-0199",
        "currentPassword": TEST_PASSWORD,
        "newPassword": "another-pass",
    });
    let response = put_json_auth(t.app(), "/api/v1/users/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["principal"]["phone"], "555-0199");

    t.login("/api/v1/users/login", "a@x.com", "another-pass").await;
}

#[tokio::test]
async fn test_profile_new_password_too_short() {
    let t = TestApp::new();
    t.seed_user("a@x.com", "user").await;
    let token = t.login("/api/v1/users/login", "a@x.com", TEST_PASSWORD).await;

    let body = serde_json::json!({ "currentPassword": TEST_PASSWORD, "newPassword": "123" });
    let response = put_json_auth(t.app(), "/api/v1/users/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
