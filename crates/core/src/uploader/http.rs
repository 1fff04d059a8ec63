//! HTTP client for the ingestion service.

use async_trait::async_trait;
use reqwest::{multipart, Body, Client};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::browser::Browser;
use super::config::PostMatchConfig;
use super::error::UploadError;
use super::post_match::PostMatchFollowUp;
use super::traits::UploadClient;
use super::types::{DuplicateCheckResponse, UploadResponse};
use crate::config::ApiConfig;
use crate::metrics;
use crate::replay::{ReplayItem, UploadStatus};

/// Upload client speaking the ingestion service's HTTP API.
pub struct HttpUploadClient {
    client: Client,
    config: ApiConfig,
    post_match: Arc<PostMatchFollowUp>,
    post_match_enabled: AtomicBool,
}

impl HttpUploadClient {
    pub fn new(
        config: ApiConfig,
        post_match: PostMatchConfig,
        browser: Arc<dyn Browser>,
    ) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UploadError::ClientBuild(e.to_string()))?;

        let follow_up = PostMatchFollowUp::new(
            client.clone(),
            config.open_api_url.clone(),
            config.web_url.clone(),
            post_match,
            browser,
        );

        Ok(Self {
            client,
            config,
            post_match: Arc::new(follow_up),
            post_match_enabled: AtomicBool::new(false),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub fn fingerprints_url(&self) -> String {
        format!("{}/replays/fingerprints", self.base_url())
    }

    pub fn upload_url(&self, fingerprint: &str) -> String {
        format!(
            "{}/upload/heroesprofile/desktop?fingerprint={}&version={}",
            self.base_url(),
            urlencoding::encode(fingerprint),
            urlencoding::encode(&self.config.client_version)
        )
    }

    async fn send_upload(
        &self,
        item: &ReplayItem,
        fingerprint: &str,
    ) -> Result<UploadStatus, UploadError> {
        let read_failed = |source| UploadError::ReadFailed {
            path: item.path.clone(),
            source,
        };
        let file = tokio::fs::File::open(&item.path).await.map_err(read_failed)?;
        let length = file.metadata().await.map_err(read_failed)?.len();

        let part = multipart::Part::stream_with_length(Body::from(file), length)
            .file_name(item.file_name());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url(fingerprint))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(path = %item.path.display(), "Upload rejected with HTTP {}", status);
            return Ok(UploadStatus::UploadError);
        }

        let body = match response.json::<UploadResponse>().await {
            Ok(body) => body,
            Err(e) => {
                warn!(path = %item.path.display(), "Malformed upload response: {}", e);
                return Ok(UploadStatus::UploadError);
            }
        };

        let upload_status = body.upload_status();
        if upload_status == UploadStatus::UploadError {
            warn!(
                path = %item.path.display(),
                "Upload response carried unrecognized status {:?}", body.status
            );
        }
        info!(path = %item.path.display(), status = %upload_status, "Uploaded replay");

        if upload_status == UploadStatus::Success && self.post_match_enabled() {
            self.post_match.spawn(body.replay_id, &item.path);
        }

        Ok(upload_status)
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn try_check_duplicates(
        &self,
        fingerprints: &HashSet<String>,
    ) -> Result<HashSet<String>, UploadError> {
        if fingerprints.is_empty() {
            return Ok(HashSet::new());
        }

        let body = fingerprints
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");

        let response = self
            .client
            .post(self.fingerprints_url())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::ApiError(format!("HTTP {}", status)));
        }

        let parsed: DuplicateCheckResponse = response
            .json()
            .await
            .map_err(|e| UploadError::ApiError(e.to_string()))?;

        let existing: HashSet<String> = parsed
            .exists
            .into_iter()
            .filter(|fp| fingerprints.contains(fp))
            .collect();
        debug!(
            checked = fingerprints.len(),
            existing = existing.len(),
            "Duplicate check complete"
        );
        Ok(existing)
    }

    async fn upload(&self, item: &ReplayItem) -> Result<UploadStatus, UploadError> {
        let fingerprint = match item.fingerprint.as_deref() {
            Some(fp) if !fp.is_empty() => fp,
            _ => {
                return Err(UploadError::MissingFingerprint {
                    path: item.path.clone(),
                })
            }
        };

        let start = Instant::now();
        let result = self.send_upload(item, fingerprint).await;
        let label = match &result {
            Ok(UploadStatus::UploadError) | Err(_) => "error",
            Ok(_) => "ok",
        };
        metrics::UPLOAD_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());
        result
    }

    fn set_post_match_enabled(&self, enabled: bool) {
        self.post_match_enabled.store(enabled, Ordering::SeqCst);
    }

    fn post_match_enabled(&self) -> bool {
        self.post_match_enabled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayIdentity;
    use crate::testing::RecordingBrowser;
    use axum::body::Bytes;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const UPLOAD_PATH: &str = "/upload/heroesprofile/desktop";
    const FINGERPRINTS_PATH: &str = "/replays/fingerprints";

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn replay_on_disk(dir: &TempDir) -> ReplayItem {
        let path = dir.path().join("match.StormReplay");
        std::fs::write(&path, b"replay bytes").unwrap();
        let mut item = ReplayItem::pending(ReplayIdentity::new(path, Utc::now()));
        item.fingerprint = Some("fp-1".to_string());
        item
    }

    fn client(base_url: &str) -> HttpUploadClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        HttpUploadClient::new(
            config,
            PostMatchConfig::default(),
            Arc::new(RecordingBrowser::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let c = client("https://api.example.test/api/");
        assert_eq!(
            c.fingerprints_url(),
            "https://api.example.test/api/replays/fingerprints"
        );
        assert_eq!(
            c.upload_url("a b"),
            "https://api.example.test/api/upload/heroesprofile/desktop?fingerprint=a%20b&version=replaylink"
        );
    }

    #[tokio::test]
    async fn test_upload_requires_fingerprint() {
        let c = client("http://127.0.0.1:9");
        let item = ReplayItem::pending(ReplayIdentity::new("/r/a.StormReplay", Utc::now()));

        let err = c.upload(&item).await.unwrap_err();
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn test_duplicate_check_fails_open() {
        let c = client("http://127.0.0.1:9");
        let fps: HashSet<String> = ["f1".to_string()].into_iter().collect();

        assert!(c.try_check_duplicates(&fps).await.is_err());
        assert!(c.check_duplicates(&fps).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_duplicate_check_skips_request() {
        let c = client("http://127.0.0.1:9");
        assert!(c.try_check_duplicates(&HashSet::new()).await.unwrap().is_empty());
    }

    #[test]
    fn test_post_match_toggle() {
        let c = client("http://127.0.0.1:9");
        assert!(!c.post_match_enabled());
        c.set_post_match_enabled(true);
        assert!(c.post_match_enabled());
    }

    #[tokio::test]
    async fn test_upload_server_error_is_upload_error() {
        let base = serve(Router::new().route(
            UPLOAD_PATH,
            post(|_body: Bytes| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;
        let dir = TempDir::new().unwrap();

        let status = client(&base).upload(&replay_on_disk(&dir)).await.unwrap();
        assert_eq!(status, UploadStatus::UploadError);
    }

    #[tokio::test]
    async fn test_upload_malformed_body_is_upload_error() {
        let base = serve(Router::new().route(
            UPLOAD_PATH,
            post(|_body: Bytes| async { "<html>not json</html>" }),
        ))
        .await;
        let dir = TempDir::new().unwrap();

        let status = client(&base).upload(&replay_on_disk(&dir)).await.unwrap();
        assert_eq!(status, UploadStatus::UploadError);
    }

    #[tokio::test]
    async fn test_upload_non_final_status_is_upload_error() {
        let base = serve(Router::new().route(
            UPLOAD_PATH,
            post(|_body: Bytes| async { Json(json!({"status": "InProgress", "replayID": 1})) }),
        ))
        .await;
        let dir = TempDir::new().unwrap();

        let status = client(&base).upload(&replay_on_disk(&dir)).await.unwrap();
        assert_eq!(status, UploadStatus::UploadError);
    }

    #[tokio::test]
    async fn test_upload_sends_file_and_fingerprint() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let base = serve(Router::new().route(
            UPLOAD_PATH,
            post(
                move |Query(query): Query<HashMap<String, String>>, body: Bytes| {
                    let sink = Arc::clone(&sink);
                    async move {
                        sink.lock().unwrap().extend_from_slice(&body);
                        if query.get("fingerprint").map(String::as_str) != Some("fp-1") {
                            return (StatusCode::BAD_REQUEST, Json(json!({})));
                        }
                        (
                            StatusCode::OK,
                            Json(json!({"status": "duplicate", "replayID": 5})),
                        )
                    }
                },
            ),
        ))
        .await;
        let dir = TempDir::new().unwrap();

        let status = client(&base).upload(&replay_on_disk(&dir)).await.unwrap();
        assert_eq!(status, UploadStatus::Duplicate);

        let body = String::from_utf8_lossy(&received.lock().unwrap()).to_string();
        assert!(body.contains("replay bytes"));
        assert!(body.contains("filename=\"match.StormReplay\""));
    }

    #[tokio::test]
    async fn test_duplicate_check_returns_requested_subset() {
        let received = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&received);
        let base = serve(Router::new().route(
            FINGERPRINTS_PATH,
            post(move |body: String| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().unwrap() = body;
                    Json(json!({"exists": ["f1", "not-asked"]}))
                }
            }),
        ))
        .await;
        let c = client(&base);
        let fps: HashSet<String> = ["f1", "f2"].iter().map(|s| s.to_string()).collect();

        let existing = c.try_check_duplicates(&fps).await.unwrap();
        assert_eq!(existing, ["f1".to_string()].into_iter().collect());

        let sent: HashSet<String> = received
            .lock()
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(sent, fps);
    }

    #[tokio::test]
    async fn test_duplicate_check_bad_responses_fail_open() {
        let failing = serve(Router::new().route(
            FINGERPRINTS_PATH,
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let garbled = serve(Router::new().route(
            FINGERPRINTS_PATH,
            post(|| async { "exists: f1" }),
        ))
        .await;
        let fps: HashSet<String> = ["f1".to_string()].into_iter().collect();

        for base in [failing, garbled] {
            let c = client(&base);
            assert!(matches!(
                c.try_check_duplicates(&fps).await,
                Err(UploadError::ApiError(_))
            ));
            assert!(c.check_duplicates(&fps).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_success_opens_match_page_when_parsed() {
        let base = serve(
            Router::new()
                .route(
                    UPLOAD_PATH,
                    post(|_body: Bytes| async {
                        Json(json!({"status": "Success", "replayID": 77}))
                    }),
                )
                .route("/openApi/Replay/Parsed/", get(|| async { "true" })),
        )
        .await;
        let config = ApiConfig {
            base_url: base.clone(),
            open_api_url: base,
            web_url: "https://www.example.test".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let post_match = PostMatchConfig {
            poll_attempts: 3,
            poll_interval_ms: 10,
            ..Default::default()
        };
        let browser = Arc::new(RecordingBrowser::new());
        let c = HttpUploadClient::new(config, post_match, browser.clone()).unwrap();
        c.set_post_match_enabled(true);
        let dir = TempDir::new().unwrap();

        let status = c.upload(&replay_on_disk(&dir)).await.unwrap();
        assert_eq!(status, UploadStatus::Success);

        let deadline = Instant::now() + Duration::from_secs(5);
        while browser.opened().is_empty() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            browser.opened(),
            vec!["https://www.example.test/Match/Single/?replayID=77".to_string()]
        );
    }
}
