//! Shared harness for HTTP-level integration tests.
//!
//! Builds the real router over in-memory stores, a recording mailer and a
//! fixed code generator, so every test runs the full request path without a
//! database or SMTP server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use happyhome_api::auth::jwt::JwtConfig;
use happyhome_api::auth::password::hash_password;
use happyhome_api::config::ServerConfig;
use happyhome_api::mail::{MailError, Mailer, OutgoingEmail};
use happyhome_api::router::build_app_router;
use happyhome_api::state::AppState;
use happyhome_core::otp::{CodeGenerator, InMemoryOtpStore, OtpConfig, OtpService};
use happyhome_db::memory::{MemoryAdminStore, MemoryUserStore};
use happyhome_db::models::admin::{Admin, CreateAdmin};
use happyhome_db::models::user::{CreateUser, User};
use happyhome_db::store::{AdminStore, UserStore};

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_CODE: &str = "123456";
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and no resend cooldown.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        min_password_length: 6,
        jwt: JwtConfig {
            user_secret: TEST_SECRET.to_string(),
            admin_secret: TEST_SECRET.to_string(),
            expiry_days: 30,
        },
        otp: OtpConfig {
            ttl: Duration::minutes(10),
            resend_cooldown: Duration::zero(),
        },
        email: None,
    }
}

// ---------------------------------------------------------------------------
// Collaborator doubles
// ---------------------------------------------------------------------------

/// Keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Rejects every message.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Build("relay unavailable".into()))
    }
}

/// Always hands out [`TEST_CODE`].
pub struct FixedCode;

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        TEST_CODE.to_string()
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

/// The router plus handles on its collaborators for seeding and inspection.
pub struct TestApp {
    pub router: Router,
    pub admins: Arc<MemoryAdminStore>,
    pub users: Arc<MemoryUserStore>,
    pub otp_store: Arc<InMemoryOtpStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        Self::build(config, mailer.clone(), mailer)
    }

    /// App whose mail transport always fails.
    pub fn with_failing_mailer() -> Self {
        Self::build(
            test_config(),
            Arc::new(FailingMailer),
            Arc::new(RecordingMailer::default()),
        )
    }

    fn build(config: ServerConfig, mailer: Arc<dyn Mailer>, recorder: Arc<RecordingMailer>) -> Self {
        let admins = Arc::new(MemoryAdminStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let otp_store = Arc::new(InMemoryOtpStore::new());
        let otp = OtpService::new(otp_store.clone(), Arc::new(FixedCode), config.otp.clone());

        let state = AppState {
            config: Arc::new(config),
            admins: admins.clone(),
            users: users.clone(),
            otp,
            mailer,
        };

        Self {
            router: build_app_router(state),
            admins,
            users,
            otp_store,
            mailer: recorder,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Insert an admin directly into the store with [`TEST_PASSWORD`].
    pub async fn seed_admin(&self, email: &str) -> Admin {
        self.admins
            .create(&CreateAdmin {
                name: "Admin User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            })
            .await
            .expect("admin creation should succeed")
    }

    /// Insert a user directly into the store with [`TEST_PASSWORD`].
    pub async fn seed_user(&self, email: &str, role: &str) -> User {
        self.users
            .create(&CreateUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
                phone: None,
                role: role.to_string(),
            })
            .await
            .expect("user creation should succeed")
    }

    /// Log in through the API and return the bearer token.
    pub async fn login(&self, path: &str, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = post_json(self.app(), path, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        json["data"]["token"]
            .as_str()
            .expect("login response should carry a token")
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}
