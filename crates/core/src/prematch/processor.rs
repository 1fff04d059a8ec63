//! Pre-match submission.

use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::error::PreMatchError;
use super::types::PrematchPlayer;
use crate::analyzer::{DecodeStatus, ReplayDecoder};
use crate::config::ApiConfig;
use crate::metrics;
use crate::uploader::Browser;

pub struct PreMatchProcessor {
    decoder: Arc<dyn ReplayDecoder>,
    browser: Arc<dyn Browser>,
    client: Client,
    web_url: String,
}

impl PreMatchProcessor {
    pub fn new(
        decoder: Arc<dyn ReplayDecoder>,
        browser: Arc<dyn Browser>,
        config: &ApiConfig,
    ) -> Result<Self, PreMatchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            decoder,
            browser,
            client,
            web_url: config.web_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn submit_url(&self) -> String {
        format!("{}/PreMatch/", self.web_url)
    }

    pub fn results_url(&self, prematch_id: i64) -> String {
        format!("{}/PreMatch/Results/?prematchID={}", self.web_url, prematch_id)
    }

    /// Submits the lobby's players and opens the results page.
    ///
    /// Failures are logged; nothing is returned to the caller.
    pub async fn open_pre_match_page(&self, lobby_path: &Path) {
        match self.try_open_pre_match_page(lobby_path).await {
            Ok(prematch_id) => {
                metrics::PREMATCH_REQUESTS.with_label_values(&["opened"]).inc();
                info!(prematch_id, "Opened pre-match page");
            }
            Err(e) => {
                metrics::PREMATCH_REQUESTS.with_label_values(&["failed"]).inc();
                error!(path = %lobby_path.display(), "Pre-match processing failed: {}", e);
            }
        }
    }

    /// Same as [`open_pre_match_page`](Self::open_pre_match_page) but reports
    /// the outcome. Returns the pre-match id on success.
    pub async fn try_open_pre_match_page(&self, lobby_path: &Path) -> Result<i64, PreMatchError> {
        let lobby = self.decoder.decode_lobby(lobby_path).await?;
        if lobby.status != DecodeStatus::Success {
            return Err(PreMatchError::NotParsed(format!("{:?}", lobby.status)));
        }
        if lobby.players.is_empty() {
            return Err(PreMatchError::NoPlayers);
        }

        let players: Vec<PrematchPlayer> = lobby.players.iter().map(PrematchPlayer::from).collect();
        let data = serde_json::to_string(&players)
            .map_err(|e| PreMatchError::UnexpectedResponse(e.to_string()))?;
        debug!(players = players.len(), "Submitting pre-match lobby");

        let body = self
            .client
            .post(self.submit_url())
            .form(&[("data", data.as_str())])
            .send()
            .await?
            .text()
            .await?;

        let prematch_id = parse_prematch_id(&body)?;
        self.browser.open_url(&self.results_url(prematch_id))?;
        Ok(prematch_id)
    }
}

fn parse_prematch_id(body: &str) -> Result<i64, PreMatchError> {
    body.trim().parse().map_err(|_| {
        PreMatchError::UnexpectedResponse(body.chars().take(100).collect::<String>())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{DecodedLobby, DecodedPlayer};
    use crate::testing::{MockDecoder, RecordingBrowser};

    fn processor(decoder: Arc<MockDecoder>, browser: Arc<RecordingBrowser>) -> PreMatchProcessor {
        let config = ApiConfig {
            web_url: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        PreMatchProcessor::new(decoder, browser, &config).unwrap()
    }

    #[test]
    fn test_parse_prematch_id() {
        assert_eq!(parse_prematch_id("12345").unwrap(), 12345);
        assert_eq!(parse_prematch_id(" 7\n").unwrap(), 7);
        assert!(matches!(
            parse_prematch_id("<html>error</html>"),
            Err(PreMatchError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_urls() {
        let p = processor(Arc::new(MockDecoder::new()), Arc::new(RecordingBrowser::new()));
        assert_eq!(p.submit_url(), "http://127.0.0.1:9/PreMatch/");
        assert_eq!(
            p.results_url(99),
            "http://127.0.0.1:9/PreMatch/Results/?prematchID=99"
        );
    }

    #[tokio::test]
    async fn test_unparsed_lobby_is_reported() {
        let decoder = Arc::new(MockDecoder::new());
        decoder
            .set_lobby(
                "/tmp/lobby.battlelobby",
                DecodedLobby {
                    status: DecodeStatus::Incomplete,
                    players: vec![],
                },
            )
            .await;
        let browser = Arc::new(RecordingBrowser::new());
        let p = processor(decoder, browser.clone());

        let result = p
            .try_open_pre_match_page(Path::new("/tmp/lobby.battlelobby"))
            .await;
        assert!(matches!(result, Err(PreMatchError::NotParsed(_))));
        assert!(browser.opened().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_never_raises() {
        let decoder = Arc::new(MockDecoder::new());
        decoder
            .set_lobby(
                "/tmp/lobby.battlelobby",
                DecodedLobby {
                    status: DecodeStatus::Success,
                    players: vec![DecodedPlayer {
                        battle_tag: "Tassadar#1".to_string(),
                        toon_id: 5,
                        region: 1,
                    }],
                },
            )
            .await;
        let browser = Arc::new(RecordingBrowser::new());
        let p = processor(decoder.clone(), browser.clone());

        p.open_pre_match_page(Path::new("/tmp/lobby.battlelobby")).await;
        assert_eq!(decoder.lobby_calls().await.len(), 1);
        assert!(browser.opened().is_empty());
    }

    #[tokio::test]
    async fn test_submission_opens_results_page() {
        use axum::{routing::post, Form, Router};
        use std::collections::HashMap;

        let app = Router::new().route(
            "/PreMatch/",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                match form.get("data") {
                    Some(data) if data.contains("\"BattleTag\":5") => "4321",
                    _ => "bad request",
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let decoder = Arc::new(MockDecoder::new());
        decoder
            .set_lobby(
                "/tmp/lobby.battlelobby",
                DecodedLobby {
                    status: DecodeStatus::Success,
                    players: vec![DecodedPlayer {
                        battle_tag: "Tassadar#5".to_string(),
                        toon_id: 5,
                        region: 1,
                    }],
                },
            )
            .await;
        let browser = Arc::new(RecordingBrowser::new());
        let config = ApiConfig {
            web_url: format!("http://{}", addr),
            timeout_secs: 2,
            ..Default::default()
        };
        let p = PreMatchProcessor::new(decoder, browser.clone(), &config).unwrap();

        let id = p
            .try_open_pre_match_page(Path::new("/tmp/lobby.battlelobby"))
            .await
            .unwrap();
        assert_eq!(id, 4321);
        assert_eq!(
            browser.opened(),
            vec![format!("http://{}/PreMatch/Results/?prematchID=4321", addr)]
        );
    }
}
