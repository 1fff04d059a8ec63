//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process router around a real [`Manager`] whose collaborators
//! are all mocks, so handlers can be exercised without a game, a decoder or
//! a network.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use replaylink_core::testing::{MemoryReplayStore, MockAnalyzer, MockFileMonitor, MockUploadClient};
use replaylink_core::{
    Analyzer, Config, FeaturesConfig, FileMonitor, Manager, ManagerConfig, ReplayStore,
    RetryPolicy, StoredReplay, UploadClient, UploadStatus,
};
use replaylink_server::api::{create_router, WsBroadcaster};
use replaylink_server::state::AppState;

/// Re-export fixtures for test convenience
pub use replaylink_core::testing::fixtures;

/// Test fixture with an in-process router and controllable mocks.
pub struct TestFixture {
    pub router: Router,
    pub manager: Arc<Manager>,
    pub monitor: Arc<MockFileMonitor>,
    pub analyzer: Arc<MockAnalyzer>,
    pub uploader: Arc<MockUploadClient>,
    pub store: Arc<MemoryReplayStore>,
    /// Holds the replay files referenced by the seeded history
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// A started manager with an empty history.
    pub async fn new() -> Self {
        Self::with_history(Vec::new()).await
    }

    /// A started manager seeded with `records`.
    pub async fn with_history(records: Vec<StoredReplay>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let store = Arc::new(MemoryReplayStore::with_records(records));
        let monitor = Arc::new(MockFileMonitor::new());
        let analyzer = Arc::new(MockAnalyzer::new());
        let uploader = Arc::new(MockUploadClient::new());

        let fast = RetryPolicy {
            max_attempts: 3,
            delay_ms: 5,
        };
        let manager = Arc::new(Manager::new(
            ManagerConfig {
                idle_interval_secs: 1,
                file_wait: fast,
                lobby_copy: fast,
            },
            FeaturesConfig::default(),
            Arc::clone(&store) as Arc<dyn ReplayStore>,
            Arc::clone(&monitor) as Arc<dyn FileMonitor>,
            Arc::clone(&analyzer) as Arc<dyn Analyzer>,
            Arc::clone(&uploader) as Arc<dyn UploadClient>,
            None,
        ));
        manager.start().await;

        let mut config = Config::default();
        config.paths.data_dir = temp_dir.path().join("data");

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&manager),
            WsBroadcaster::default(),
        ));
        let router = create_router(state);

        Self {
            router,
            manager,
            monitor,
            analyzer,
            uploader,
            store,
            temp_dir,
        }
    }

    /// Writes a replay file into the fixture's temp dir.
    pub fn replay(&self, name: &str) -> PathBuf {
        fixtures::write_replay(self.temp_dir.path(), name)
    }

    /// Polls until the replay reaches `expected`.
    pub async fn wait_for_status(&self, path: &std::path::Path, expected: UploadStatus) -> bool {
        for _ in 0..250 {
            if self.manager.get(path).await.map(|i| i.status) == Some(expected) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

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
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
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
