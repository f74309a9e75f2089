//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock media server library injected, enabling E2E testing of the
//! sync surface without a real media server.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use shelfsync_core::{
    config::{DatabaseConfig, SyncConfig},
    testing::{MockConnector, MockMediaLibrary},
    CatalogStore, Config, LibraryConnector, MediaServerSettings, SettingsStore, SqliteCatalog,
    SqliteSettingsStore,
};

/// Re-export fixtures for test convenience
pub use shelfsync_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_sync_page() {
///     let fixture = TestFixture::new().await;
///     fixture.library.add_library("lib", "Movies", fixtures::numbered_movies(3)).await;
///
///     let response = fixture.post("/api/v1/sync", json!({ "libraryId": "lib" })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock media server library - add libraries and inject failures
    pub library: MockMediaLibrary,
    /// Mock connector - simulate handshake failures
    pub connector: Arc<MockConnector>,
    /// Catalog behind the router, for direct assertions
    pub catalog: Arc<SqliteCatalog>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with media server settings stored.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            sync: SyncConfig {
                page_size: test_config.page_size,
                excluded_titles: test_config.excluded_titles.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let settings = Arc::new(
            SqliteSettingsStore::new(&db_path).expect("Failed to create settings store"),
        );
        if test_config.configure_media_server {
            settings
                .save(&MediaServerSettings::new("http://media.test:8096", "test-key"))
                .expect("Failed to save settings");
        }
        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));

        let library = MockMediaLibrary::new();
        let connector = Arc::new(MockConnector::new(library.clone()));

        let state = Arc::new(shelfsync_server::state::AppState::new(
            config,
            settings as Arc<dyn SettingsStore>,
            Arc::clone(&catalog) as Arc<dyn CatalogStore>,
            Arc::clone(&connector) as Arc<dyn LibraryConnector>,
        ));

        let router = shelfsync_server::api::create_router(state);

        Self {
            router,
            library,
            connector,
            catalog,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await.0
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (response, bytes) = self.send(request).await;
        (response.status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await.0
    }

    async fn send(&self, request: Request<Body>) -> (TestResponse, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        (TestResponse { status, body }, body_bytes)
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Store media server settings before the router is built
    pub configure_media_server: bool,
    pub page_size: u32,
    pub excluded_titles: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            configure_media_server: true,
            page_size: 200,
            excluded_titles: Vec::new(),
        }
    }
}

impl TestConfig {
    /// Create config without stored media server settings.
    pub fn unconfigured() -> Self {
        Self {
            configure_media_server: false,
            ..Default::default()
        }
    }

    /// Create config with the given page size and deny-list.
    pub fn with_sync(page_size: u32, excluded_titles: &[&str]) -> Self {
        Self {
            page_size,
            excluded_titles: excluded_titles.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
