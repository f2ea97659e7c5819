use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use taskman_core::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use taskman_core::{AdminAccount, InMemoryStore, PasswordHasher, TokenService, seed_defaults};
use taskman_db::Backend;
use taskman_server::routes;
use taskman_server::state::AppState;

pub const TEST_JWT_SECRET: &[u8] = b"test-secret";

pub struct TestApp {
    pub router: Router,
}

/// Build the app on an in-memory store seeded with the admin, statuses and labels.
pub async fn setup_test_app() -> TestApp {
    let store = Backend::Memory(InMemoryStore::new());
    let hasher = PasswordHasher::with_params(8, 1).expect("valid argon2 params");
    let tokens = TokenService::new(TEST_JWT_SECRET, chrono::Duration::minutes(60))
        .expect("valid token settings");

    seed_defaults(&store, &hasher, &AdminAccount::default())
        .await
        .expect("Failed to seed defaults");

    let state = Arc::new(AppState::new(store, tokens, hasher));
    TestApp {
        router: routes::router(state),
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and decode the body as JSON (`Null` for empty bodies).
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.send(request).await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        if body.is_empty() {
            return (status, serde_json::Value::Null);
        }
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// POST /api/login and return the issued token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(post_json(
                "/api/login",
                None,
                &serde_json::json!({ "username": email, "password": password }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    pub async fn admin_token(&self) -> String {
        self.login(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD).await
    }

    /// Register a user through the public endpoint and return its id.
    pub async fn register(&self, email: &str, password: &str) -> i64 {
        let (status, json) = self
            .send_json(post_json(
                "/api/users",
                None,
                &serde_json::json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
        json["id"].as_i64().unwrap()
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::get(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::delete(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    with_auth(Request::post(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn put_json(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    with_auth(Request::put(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}
