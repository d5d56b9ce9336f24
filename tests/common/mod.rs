#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ecosteps_backend::config::Config;
use ecosteps_backend::handlers;
use ecosteps_backend::repositories::InMemoryStore;
use ecosteps_backend::AppState;
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection, DbErr};
use serde_json::{json, Value};
use std::env;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

/// Set up test database connection
/// Returns None when TEST_DATABASE_URL is not set so Postgres tests can skip
pub async fn setup_test_db() -> Option<Result<DatabaseConnection, DbErr>> {
    let database_url = env::var("TEST_DATABASE_URL").ok()?;
    Some(Database::connect(&database_url).await)
}

/// Router over the in-memory store with one configured reviewer
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub reviewer: Uuid,
    _storage: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let storage = tempfile::tempdir().expect("Failed to create storage dir");
        let reviewer = Uuid::new_v4();

        let vars: HashMap<&str, String> = HashMap::from([
            ("STORAGE_ROOT", storage.path().display().to_string()),
            ("REVIEWER_IDS", reviewer.to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("valid config");

        let state = AppState::new(Arc::new(InMemoryStore::new()), &config);

        TestApp {
            router: handlers::router(state.clone()),
            state,
            reviewer,
            _storage: storage,
        }
    }

    /// Sends a JSON request as `user` and returns the status and parsed body
    /// (`Value::Null` for empty bodies)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.request("GET", uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(user), Some(body)).await
    }

    /// Registers a profile with the given role and returns its id
    pub async fn create_user(&self, role: &str) -> Uuid {
        let id = Uuid::new_v4();
        let (status, body) = self
            .post(
                "/api/users",
                id,
                json!({
                    "email": format!("{}@example.org", id.simple()),
                    "full_name": "Test User",
                    "role": role,
                    "organization_name": if role == "ngo" { Some("Green Future") } else { None },
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
        id
    }

    pub async fn create_garden(&self, owner: Uuid) -> Uuid {
        let (status, body) = self
            .post(
                "/api/gardens",
                owner,
                json!({
                    "name": "Riverside Plot",
                    "location": { "address": "12 River Road, Springfield" },
                    "garden_type": "community",
                    "size_sqm": "250",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create garden failed: {body}");
        parse_uuid(&body["id"])
    }

    /// Ten mature oaks: 0.48 t CO2
    pub async fn create_submission(&self, owner: Uuid, garden: Uuid) -> Uuid {
        let (status, body) = self
            .post(
                "/api/submissions",
                owner,
                json!({
                    "garden_id": garden,
                    "trees": [
                        { "species_name": "oak", "count": 10, "age_years": 10, "diameter_cm": 30 }
                    ],
                    "equipment": [ { "equipment_type": "rain_barrel", "quantity": 2 } ],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create submission failed: {body}");
        parse_uuid(&body["id"])
    }

    /// Approves `submission` as the reviewer and returns the issued credit id
    pub async fn approve(&self, submission: Uuid) -> Uuid {
        let (status, body) = self
            .post(
                &format!("/api/submissions/{submission}/status"),
                self.reviewer,
                json!({ "status": "approved", "reviewer_notes": "Looks good" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
        parse_uuid(&body["credit"]["id"])
    }
}

pub fn parse_uuid(value: &Value) -> Uuid {
    Uuid::parse_str(value.as_str().expect("uuid string")).expect("valid uuid")
}

pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        other => other.to_string().parse().expect("decimal number"),
    }
}
