//! Decoder backed by an external command-line tool.
//!
//! The tool is invoked as `<decoder> replay <path>` or `<decoder> lobby <path>`
//! and must print a single JSON document on stdout.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::AnalyzerConfig;
use super::error::AnalyzerError;
use super::traits::ReplayDecoder;
use super::types::{DecodedLobby, DecodedReplay};

/// Runs an external decoder process per file.
pub struct CommandDecoder {
    config: AnalyzerConfig,
}

impl CommandDecoder {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Creates a decoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }

    async fn run<T: DeserializeOwned>(&self, mode: &str, path: &Path) -> Result<T, AnalyzerError> {
        if !path.exists() {
            return Err(AnalyzerError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        debug!(decoder = %self.config.decoder_command.display(), mode, path = %path.display(), "Running decoder");

        let child = Command::new(&self.config.decoder_command)
            .arg(mode)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(Duration::from_secs(self.config.decoder_timeout_secs), child).await
        {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AnalyzerError::DecoderNotFound {
                        path: self.config.decoder_command.clone(),
                    }
                } else {
                    AnalyzerError::Io(e)
                }
            })?,
            Err(_) => {
                return Err(AnalyzerError::Timeout {
                    timeout_secs: self.config.decoder_timeout_secs,
                })
            }
        };

        if !output.status.success() {
            return Err(AnalyzerError::decode_failed(format!(
                "decoder exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_output(&output.stdout)
    }
}

fn parse_output<T: DeserializeOwned>(stdout: &[u8]) -> Result<T, AnalyzerError> {
    serde_json::from_slice(stdout).map_err(|e| AnalyzerError::parse_error(e.to_string()))
}

#[async_trait]
impl ReplayDecoder for CommandDecoder {
    fn name(&self) -> &str {
        "command"
    }

    async fn decode_replay(&self, path: &Path) -> Result<DecodedReplay, AnalyzerError> {
        self.run("replay", path).await
    }

    async fn decode_lobby(&self, path: &Path) -> Result<DecodedLobby, AnalyzerError> {
        self.run("lobby", path).await
    }

    async fn validate(&self) -> Result<(), AnalyzerError> {
        let result = Command::new(&self.config.decoder_command)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AnalyzerError::DecoderNotFound {
                    path: self.config.decoder_command.clone(),
                })
            }
            Err(e) => Err(AnalyzerError::Io(e)),
        }
    }
}
