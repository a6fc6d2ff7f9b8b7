#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use purifier_backend::api::router;
use purifier_backend::auth::TokenAuth;
use purifier_backend::db;
use purifier_backend::notify::RecordingNotifier;
use purifier_backend::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn spawn_app() -> TestApp {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create test database");
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState {
        db: pool.clone(),
        notifier: notifier.clone(),
        auth: Arc::new(TokenAuth::new(b"integration-secret", chrono::Duration::hours(1))),
    };

    TestApp {
        app: router(state),
        pool,
        notifier,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to call router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Registers a technician and returns `(technician id, token)`.
    pub async fn login_as(&self, contact_number: &str) -> (String, String) {
        let (status, technician) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "fullName": format!("Tech {}", contact_number),
                    "contactNumber": contact_number,
                    "address": "Service Lane",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register: {}", technician);

        let (status, login) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "contactNumber": contact_number })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login: {}", login);

        (
            technician["id"].as_str().expect("technician id").to_string(),
            login["token"].as_str().expect("token").to_string(),
        )
    }

    /// Creates an automatic-schedule customer and returns its JSON.
    pub async fn create_customer(&self, token: &str, number_of_services: i64) -> Value {
        let (status, customer) = self
            .send(
                Method::POST,
                "/api/customers",
                Some(token),
                Some(json!({
                    "fullName": "Anita Rao",
                    "contactNumber": "9123456780",
                    "address": "4 Hill Road",
                    "area": "East",
                    "category": "AMC",
                    "joiningDate": "2024-01-01",
                    "numberOfServices": number_of_services,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create customer: {}", customer);
        customer
    }
}

pub fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string id").to_string())
        .collect()
}
