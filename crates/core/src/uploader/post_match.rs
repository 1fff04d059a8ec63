//! Post-match follow-up.

use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use super::browser::Browser;
use super::config::PostMatchConfig;

/// Polls the service until an uploaded match is parsed, then opens its page.
pub struct PostMatchFollowUp {
    client: Client,
    open_api_url: String,
    web_url: String,
    config: PostMatchConfig,
    browser: Arc<dyn Browser>,
}

impl PostMatchFollowUp {
    pub fn new(
        client: Client,
        open_api_url: impl Into<String>,
        web_url: impl Into<String>,
        config: PostMatchConfig,
        browser: Arc<dyn Browser>,
    ) -> Self {
        Self {
            client,
            open_api_url: open_api_url.into().trim_end_matches('/').to_string(),
            web_url: web_url.into().trim_end_matches('/').to_string(),
            config,
            browser,
        }
    }

    pub fn parsed_url(&self, replay_id: i64) -> String {
        format!("{}/openApi/Replay/Parsed/?replayID={}", self.open_api_url, replay_id)
    }

    pub fn match_url(&self, replay_id: i64) -> String {
        format!("{}/Match/Single/?replayID={}", self.web_url, replay_id)
    }

    /// A follow-up only makes sense for a known replay id and a file that was
    /// written recently, i.e. the match that just ended.
    pub fn is_eligible(&self, replay_id: i64, path: &Path) -> bool {
        if replay_id == 0 {
            return false;
        }
        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return false,
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age <= self.config.max_replay_age(),
            // Written "in the future": clock skew, treat as fresh.
            Err(_) => true,
        }
    }

    /// Polls until the replay is parsed and opens its page.
    ///
    /// Returns whether the page was opened. Never fails.
    pub async fn run(&self, replay_id: i64) -> bool {
        let url = self.parsed_url(replay_id);

        for attempt in 1..=self.config.poll_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.config.poll_interval()).await;
            }

            match self.is_parsed(&url).await {
                Ok(true) => {
                    let page = self.match_url(replay_id);
                    info!(replay_id, "Opening match page");
                    if let Err(e) = self.browser.open_url(&page) {
                        warn!(replay_id, "Failed to open match page: {}", e);
                        return false;
                    }
                    return true;
                }
                Ok(false) => debug!(replay_id, attempt, "Replay not parsed yet"),
                Err(e) => debug!(replay_id, attempt, "Parse status check failed: {}", e),
            }
        }

        warn!(
            replay_id,
            "Gave up waiting for match page after {} attempts", self.config.poll_attempts
        );
        false
    }

    async fn is_parsed(&self, url: &str) -> Result<bool, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(body.trim().eq_ignore_ascii_case("true"))
    }

    /// Runs the follow-up in the background if the replay qualifies.
    pub fn spawn(self: &Arc<Self>, replay_id: i64, path: &Path) {
        if !self.is_eligible(replay_id, path) {
            debug!(replay_id, path = %path.display(), "Skipping post-match follow-up");
            return;
        }
        let follow_up = Arc::clone(self);
        tokio::spawn(async move {
            follow_up.run(replay_id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBrowser;
    use tempfile::TempDir;

    fn follow_up(browser: Arc<RecordingBrowser>, config: PostMatchConfig) -> PostMatchFollowUp {
        PostMatchFollowUp::new(
            Client::new(),
            "http://127.0.0.1:9/",
            "https://www.example.test/",
            config,
            browser,
        )
    }

    #[test]
    fn test_urls() {
        let f = follow_up(Arc::new(RecordingBrowser::new()), PostMatchConfig::default());
        assert_eq!(
            f.parsed_url(42),
            "http://127.0.0.1:9/openApi/Replay/Parsed/?replayID=42"
        );
        assert_eq!(
            f.match_url(42),
            "https://www.example.test/Match/Single/?replayID=42"
        );
    }

    #[test]
    fn test_default_parsed_url_is_host_root() {
        let api = crate::config::ApiConfig::default();
        let f = PostMatchFollowUp::new(
            Client::new(),
            api.open_api_url,
            api.web_url,
            PostMatchConfig::default(),
            Arc::new(RecordingBrowser::new()),
        );
        assert_eq!(
            f.parsed_url(42),
            "https://api.heroesprofile.com/openApi/Replay/Parsed/?replayID=42"
        );
    }

    #[test]
    fn test_eligibility() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.StormReplay");
        std::fs::write(&path, b"x").unwrap();
        let f = follow_up(Arc::new(RecordingBrowser::new()), PostMatchConfig::default());

        assert!(f.is_eligible(7, &path));
        assert!(!f.is_eligible(0, &path));
        assert!(!f.is_eligible(7, &dir.path().join("missing.StormReplay")));
    }

    #[test]
    fn test_old_replay_not_eligible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.StormReplay");
        std::fs::write(&path, b"x").unwrap();
        let config = PostMatchConfig {
            max_replay_age_mins: 0,
            ..Default::default()
        };
        let f = follow_up(Arc::new(RecordingBrowser::new()), config);

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!f.is_eligible(7, &path));
    }

    #[tokio::test]
    async fn test_unreachable_service_gives_up() {
        let browser = Arc::new(RecordingBrowser::new());
        let config = PostMatchConfig {
            poll_attempts: 2,
            poll_interval_ms: 1,
            ..Default::default()
        };
        let f = follow_up(browser.clone(), config);

        assert!(!f.run(42).await);
        assert!(browser.opened().is_empty());
    }
}
