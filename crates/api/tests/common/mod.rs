//! Common test utilities for integration tests.
//!
//! Tests run against a real PostgreSQL database named by `TEST_DATABASE_URL`
//! and are skipped when it is unset. Every test creates its own organization
//! and framework, so tests can share one database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use compliance_api::{
    app::{create_app, AppState},
    config::Config,
    storage::{BlobReader, BlobStore, LocalStorage, StorageError, StorageResult},
};
use fake::{faker::name::en::Name, Fake};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "SecureP@ss123!";
const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
const MULTIPART_BOUNDARY: &str = "compliance-test-boundary";

/// Connects to the test database, or returns `None` when none is configured.
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    Some(pool)
}

pub async fn run_migrations(pool: &PgPool) {
    sqlx::migrate!("../persistence/src/migrations")
        .run(pool)
        .await
        .expect("Failed to run migrations");
}

/// Test configuration with rate limiting disabled.
pub fn test_config() -> Config {
    let database_url = std::env::var("TEST_DATABASE_URL").unwrap_or_default();
    Config::from_toml_with_overrides(&[
        ("database.url", database_url.as_str()),
        ("database.max_connections", "5"),
        ("database.min_connections", "1"),
        ("logging.level", "debug"),
        ("logging.format", "pretty"),
        ("security.auth_rate_limit_per_minute", "0"),
        ("jwt.secret", TEST_SECRET),
        ("jwt.access_token_expiry_secs", "3600"),
        ("storage.max_upload_bytes", "1048576"),
    ])
    .expect("Failed to build test config")
}

/// An application wired to temporary storage directories.
pub struct TestApp {
    pub pool: PgPool,
    pub router: Router,
    _evidence_dir: TempDir,
    _export_dir: TempDir,
}

impl TestApp {
    /// Builds the app, or `None` when no test database is configured.
    pub async fn spawn() -> Option<Self> {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: Config) -> Option<Self> {
        Self::build(config, None).await
    }

    /// Builds the app with a caller-supplied artifact store.
    pub async fn spawn_with_export_store(export_store: Arc<dyn BlobStore>) -> Option<Self> {
        Self::build(test_config(), Some(export_store)).await
    }

    async fn build(config: Config, export_store: Option<Arc<dyn BlobStore>>) -> Option<Self> {
        let pool = create_test_pool().await?;
        run_migrations(&pool).await;

        let evidence_dir = TempDir::new().unwrap();
        let export_dir = TempDir::new().unwrap();
        let evidence_store = LocalStorage::new(evidence_dir.path()).await.unwrap();
        let export_store = match export_store {
            Some(store) => store,
            None => Arc::new(LocalStorage::new(export_dir.path()).await.unwrap()),
        };

        let state = AppState::new(
            config,
            pool.clone(),
            Arc::new(evidence_store),
            export_store,
        )
        .unwrap();

        Some(Self {
            pool,
            router: create_app(state),
            _evidence_dir: evidence_dir,
            _export_dir: export_dir,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registers a user and returns `(access_token, user body)`.
    pub async fn register_and_login(
        &self,
        role: &str,
        organization_id: Option<Uuid>,
    ) -> (String, Value) {
        let email = unique_test_email();
        let full_name: String = Name().fake();
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                json!({
                    "email": email,
                    "password": TEST_PASSWORD,
                    "full_name": full_name,
                    "role": role,
                    "organization_id": organization_id,
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let user = body_json(response).await;

        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                json!({ "email": email, "password": TEST_PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        (token, user)
    }

    /// A Founder with a fresh organization.
    pub async fn founder(&self) -> (String, Uuid) {
        let (token, user) = self.register_and_login("Founder", None).await;
        let organization_id = user["organization_id"].as_str().unwrap().parse().unwrap();
        (token, organization_id)
    }
}

/// Artifact store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl BlobStore for FailingStore {
    async fn put(&self, _key: &str, _data: &[u8]) -> StorageResult<String> {
        Err(StorageError::UploadFailed("disk full".into()))
    }

    async fn get(&self, location: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(location.to_string()))
    }

    async fn open(&self, location: &str) -> StorageResult<(BlobReader, u64)> {
        Err(StorageError::NotFound(location.to_string()))
    }

    async fn exists(&self, _location: &str) -> StorageResult<bool> {
        Ok(false)
    }

    async fn delete(&self, _location: &str) -> StorageResult<()> {
        Ok(())
    }
}

/// A framework with a unique name and one High control `C1`.
pub async fn seed_framework(pool: &PgPool) -> (Uuid, Uuid) {
    let framework_id: Uuid = sqlx::query_scalar(
        "INSERT INTO frameworks (name, version, description) VALUES ($1, '1.0', 'Test') RETURNING id",
    )
    .bind(format!("Test Framework {}", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await
    .unwrap();

    let control_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO controls (framework_id, control_code, title, description, severity)
        VALUES ($1, 'C1', 'Access Reviews', 'Review access quarterly', 'high')
        RETURNING id
        "#,
    )
    .bind(framework_id)
    .fetch_one(pool)
    .await
    .unwrap();

    (framework_id, control_id)
}

pub fn unique_test_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4())
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Multipart evidence upload request.
pub fn upload_request(
    token: &str,
    control_id: Uuid,
    file_name: &str,
    bytes: &[u8],
    description: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    let mut text_field = |name: &str, value: &str| {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    };
    text_field("control_id", &control_id.to_string());
    if let Some(description) = description {
        text_field("description", description);
    }
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/evidence/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap_or(Value::Null)
}
